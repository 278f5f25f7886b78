use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::QuerySetConfig;
use crate::db::connection::RecordSource;
use crate::model::Model;
use crate::query::cache::{Cacher, MemoryCacher};
use crate::query::error::QueryError;
use crate::query::queryset::QuerySet;

/// Entry point for list queries on model `M`.
///
/// Holds no query state of its own; every call to [`Manager::objects`] starts
/// a new, empty QuerySet with its own cache.
pub struct Manager<M> {
    source: Arc<dyn RecordSource>,
    cacher: Arc<dyn Cacher>,
    config: QuerySetConfig,
    _marker: PhantomData<fn() -> M>,
}

impl<M> Clone for Manager<M> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            cacher: Arc::clone(&self.cacher),
            config: self.config.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Manager<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("source", &self.source)
            .field("cacher", &self.cacher)
            .field("config", &self.config)
            .finish()
    }
}

impl<M: Model> Manager<M> {
    /// Manager whose QuerySets use in-memory caches sized from `config`.
    pub fn new(source: Arc<dyn RecordSource>, config: QuerySetConfig) -> Result<Self, QueryError> {
        let cacher = Arc::new(MemoryCacher::new(config.cache_config()));
        Self::with_cacher(source, cacher, config)
    }

    pub fn with_cacher(
        source: Arc<dyn RecordSource>,
        cacher: Arc<dyn Cacher>,
        config: QuerySetConfig,
    ) -> Result<Self, QueryError> {
        config.validate()?;
        Ok(Self {
            source,
            cacher,
            config,
            _marker: PhantomData,
        })
    }

    /// New empty QuerySet over all of `M`'s records.
    pub fn objects(&self) -> QuerySet<M> {
        // request_limit was validated when the manager was built
        QuerySet::from_parts(
            Arc::clone(&self.source),
            M::collection(),
            self.cacher.new_cache(),
            self.config.request_limit,
        )
    }

    pub fn source(&self) -> &Arc<dyn RecordSource> {
        &self.source
    }

    pub fn config(&self) -> &QuerySetConfig {
        &self.config
    }
}
