pub use cache::{
    Cacher, EmptyCacheError, MemoryCache, MemoryCacheConfig, MemoryCacher, RecordCache, TotalCount,
};
pub use error::QueryError;
pub use filter_expression::{Filter, FilterOperator, Filters, WireOperator};
pub use iter::{Iter, ModelIter, Slice, ValuesIter};
pub use manager::Manager;
pub use queryset::QuerySet;
pub use restrictions::{Pagination, Restrictions};
pub use sort_expression::{Sort, SortDirection, Sorts};

pub mod cache;
pub mod error;
pub mod filter_expression;
pub mod iter;
pub mod manager;
pub mod queryset;
pub mod restrictions;
pub mod sort_expression;
