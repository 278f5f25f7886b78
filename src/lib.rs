//! Lazy, page-cached QuerySets over remote REST collections.

// modules
pub mod config;
pub mod db;
pub mod model;
pub mod query;
pub mod registration;
pub mod relation;

// Public API
pub use config::{DEFAULT_REQUEST_LIMIT, QuerySetConfig};
pub use db::{
    AsyncRecordSource, BlockingSource, ListResponse, MemorySource, MockRecordSource, PageRequest,
    RecordSource, SourceError,
};
#[cfg(feature = "restless")]
pub use db::{RestlessConfig, RestlessTranslator};
pub use model::{Materialize, Model, Models, Values};
pub use query::{
    Cacher, EmptyCacheError, Filter, FilterOperator, Filters, Iter, Manager, MemoryCache,
    MemoryCacheConfig, MemoryCacher, ModelIter, Pagination, QueryError, QuerySet, RecordCache,
    Restrictions, Slice, Sort, SortDirection, Sorts, TotalCount, ValuesIter, WireOperator,
};
pub use registration::{ModelRegistry, ModelSchema};
pub use relation::{Relation, RelationKind};

// Convenient prelude for users
pub mod prelude {
    pub use crate::{
        Manager, Model, ModelRegistry, QueryError, QuerySet, QuerySetConfig, RecordSource,
        Relation, SourceError, TotalCount,
    };
}
