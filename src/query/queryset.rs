//! Lazy, page-cached view over one remote collection.

use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::QuerySetConfig;
use crate::db::connection::{PageRequest, RecordSource};
use crate::model::{Materialize, Model, Models, Values};
use crate::query::cache::{RecordCache, TotalCount};
use crate::query::error::QueryError;
use crate::query::filter_expression::Filters;
use crate::query::iter::{Iter, Slice};
use crate::query::restrictions::{Pagination, Restrictions};
use crate::query::sort_expression::Sorts;

/// A lazily evaluated list request.
///
/// Building a QuerySet never touches the network. Records are fetched one page
/// (`request_limit` records) at a time, only when counting, indexing or
/// iteration reaches an offset that is not cached yet.
///
/// `filter`, `order_by`, `all` and `values` return new QuerySets with copied
/// restrictions and an empty cache of the same kind; cached pages are never
/// shared between instances. `R` selects what iteration yields: materialized
/// models ([`Models`]) or raw records ([`Values`]).
pub struct QuerySet<M, R = Models> {
    source: Arc<dyn RecordSource>,
    collection: String,
    filters: Filters,
    sorts: Sorts,
    cache: Box<dyn RecordCache>,
    request_limit: usize,
    _marker: PhantomData<fn() -> (M, R)>,
}

impl<M, R> fmt::Debug for QuerySet<M, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySet")
            .field("collection", &self.collection)
            .field("filters", &self.filters)
            .field("sorts", &self.sorts)
            .field("request_limit", &self.request_limit)
            .field("cached", &self.cache.len())
            .field("total_count", &self.cache.total_count())
            .finish_non_exhaustive()
    }
}

impl<M: Model> QuerySet<M, Models> {
    /// Empty QuerySet over `M`'s collection.
    pub fn new(
        source: Arc<dyn RecordSource>,
        cache: Box<dyn RecordCache>,
        config: &QuerySetConfig,
    ) -> Result<Self, QueryError> {
        Self::for_collection(source, M::collection(), cache, config.request_limit)
    }
}

impl<M, R> QuerySet<M, R>
where
    R: Materialize<M>,
{
    /// Empty QuerySet over an explicitly named collection.
    pub fn for_collection(
        source: Arc<dyn RecordSource>,
        collection: impl Into<String>,
        cache: Box<dyn RecordCache>,
        request_limit: usize,
    ) -> Result<Self, QueryError> {
        if request_limit == 0 {
            return Err(QueryError::InvalidRequestLimit);
        }
        Ok(Self::from_parts(source, collection.into(), cache, request_limit))
    }

    /// Caller guarantees `request_limit > 0`.
    pub(crate) fn from_parts(
        source: Arc<dyn RecordSource>,
        collection: String,
        cache: Box<dyn RecordCache>,
        request_limit: usize,
    ) -> Self {
        Self {
            source,
            collection,
            filters: Filters::new(),
            sorts: Sorts::new(),
            cache,
            request_limit,
            _marker: PhantomData,
        }
    }

    /// Copy of the restrictions with a fresh, empty cache.
    fn derive<R2>(&self) -> QuerySet<M, R2> {
        QuerySet {
            source: Arc::clone(&self.source),
            collection: self.collection.clone(),
            filters: self.filters.clone(),
            sorts: self.sorts.clone(),
            cache: self.cache.fresh(),
            request_limit: self.request_limit,
            _marker: PhantomData,
        }
    }

    /// New QuerySet with the filter expressions ANDed to the existing ones.
    ///
    /// Expressions are `field__op` keys with a value, `op` one of `eq`, `ne`,
    /// `gt`, `lt`, `in`.
    pub fn filter<I, K, V>(&self, exprs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut qs = self.derive();
        qs.filters.apply(exprs)?;
        Ok(qs)
    }

    /// New QuerySet with the ordering changed. `-field` sorts descending.
    pub fn order_by<I, S>(&self, exprs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut qs = self.derive();
        qs.sorts.apply(exprs)?;
        Ok(qs)
    }

    pub fn all(&self) -> Self {
        self.derive()
    }

    /// New QuerySet that yields raw records instead of models.
    pub fn values(&self) -> QuerySet<M, Values> {
        self.derive()
    }

    /// Change the page size for subsequent fetches. Cached pages stay.
    pub fn set_request_limit(&mut self, limit: usize) -> Result<&mut Self, QueryError> {
        if limit == 0 {
            return Err(QueryError::InvalidRequestLimit);
        }
        self.request_limit = limit;
        Ok(self)
    }

    pub fn request_limit(&self) -> usize {
        self.request_limit
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn sorts(&self) -> &Sorts {
        &self.sorts
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// True if an ordering has been requested.
    pub fn ordered(&self) -> bool {
        !self.sorts.is_empty()
    }

    pub fn cache(&self) -> &dyn RecordCache {
        self.cache.as_ref()
    }

    /// Restrictions sent for the page starting at `offset`.
    pub fn restrictions(&self, offset: usize) -> Restrictions {
        Restrictions::new(
            self.filters.clone(),
            self.sorts.clone(),
            Pagination::window(offset, self.request_limit),
        )
    }

    fn page_request(&self, offset: usize) -> PageRequest {
        let Restrictions {
            filters,
            sorts,
            pagination,
        } = self.restrictions(offset);
        PageRequest {
            collection: self.collection.clone(),
            filters,
            sorts,
            pagination,
        }
    }

    /// Fetch `request_limit` records at `offset` and store them.
    ///
    /// Records past the requested window are dropped. A response without a
    /// total count marks the collection as unbounded.
    pub fn cache_page(&mut self, offset: usize) -> Result<(), QueryError> {
        let request = self.page_request(offset);
        let response = self.source.fetch_page(&request)?;
        let returned = response.records.len();
        let total = TotalCount::from(response.total_count);

        let mut records = response.records;
        records.truncate(self.request_limit);
        self.cache.write_range(offset, records);
        self.cache.set_total_count(total);

        tracing::debug!(
            "[queryset] cache_page collection={} offset={} limit={} returned={} total={}",
            self.collection,
            offset,
            self.request_limit,
            returned,
            total
        );
        Ok(())
    }

    /// Number of matching records. Fetches the first page if nothing is
    /// known yet, otherwise answers from the cache.
    pub fn count(&mut self) -> Result<TotalCount, QueryError> {
        if let Some(total) = self.cache.total_count() {
            return Ok(total);
        }
        self.cache_page(0)?;
        Ok(self.cache.total_count().unwrap_or(TotalCount::Unbounded))
    }

    /// True unless the count is known to be zero.
    pub fn exists(&mut self) -> Result<bool, QueryError> {
        Ok(!self.count()?.is_zero())
    }

    pub fn is_empty(&mut self) -> Result<bool, QueryError> {
        Ok(!self.exists()?)
    }

    /// Item at `index`.
    pub fn get(&mut self, index: isize) -> Result<R::Item, QueryError> {
        let index = non_negative(index)?;
        let count = self.count()?;
        if !count.includes(index) {
            return Err(QueryError::IndexOutOfRange { index, count });
        }
        let hit = self.slice_from(index, Some(index + 1), 1).next();
        match hit {
            Some(item) => item,
            // The source returned a short page where the count promised more.
            None => Err(QueryError::IndexOutOfRange { index, count }),
        }
    }

    /// Lazy `[start:stop:step]` view. Negative bounds and non-positive steps
    /// are rejected before anything is fetched.
    pub fn slice(
        &mut self,
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    ) -> Result<Slice<'_, M, R>, QueryError> {
        let start = start.map(non_negative).transpose()?.unwrap_or(0);
        let stop = stop.map(non_negative).transpose()?;
        let step = match step {
            None => 1,
            Some(s) if s > 0 => s.unsigned_abs(),
            Some(s) if s < 0 => return Err(QueryError::NegativeIndex { value: s }),
            Some(s) => return Err(QueryError::InvalidStep { step: s }),
        };
        Ok(self.slice_from(start, stop, step))
    }

    fn slice_from(&mut self, start: usize, stop: Option<usize>, step: usize) -> Slice<'_, M, R> {
        Slice::new(self, start, stop, step)
    }

    /// Fresh pass over the whole collection.
    pub fn iter(&mut self) -> Iter<'_, M, R> {
        Iter::new(self)
    }

    /// Read one cached record, fetching its page once on a miss. `None`
    /// means the source had nothing at that index.
    pub(crate) fn resolve(&mut self, index: usize) -> Result<Option<&Value>, QueryError> {
        if !self.cache.contains(index) {
            tracing::trace!("[queryset] cache miss at {}", index);
            self.cache_page(index - index % self.request_limit)?;
        }
        Ok(self.cache.read(index).ok())
    }

    pub(crate) fn cached(&self, index: usize) -> Option<&Value> {
        self.cache.read(index).ok()
    }

    pub(crate) fn known_total(&self) -> Option<TotalCount> {
        self.cache.total_count()
    }
}

impl<'a, M, R> IntoIterator for &'a mut QuerySet<M, R>
where
    R: Materialize<M>,
{
    type Item = Result<R::Item, QueryError>;
    type IntoIter = Iter<'a, M, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn non_negative(value: isize) -> Result<usize, QueryError> {
    usize::try_from(value).map_err(|_| QueryError::NegativeIndex { value })
}
