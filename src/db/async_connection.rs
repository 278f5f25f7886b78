//! Bridge from asynchronous record sources to the blocking fetch contract.

use futures::future::BoxFuture;
use std::fmt;

use crate::db::connection::{ListResponse, PageRequest, RecordSource, SourceError};

/// Record source whose fetches are futures, object-safe like
/// [`RecordSource`]. The returned future owns everything it needs.
pub trait AsyncRecordSource: Send + Sync + fmt::Debug {
    fn fetch_page(&self, request: &PageRequest) -> BoxFuture<'static, Result<ListResponse, SourceError>>;
}

/// Drives an [`AsyncRecordSource`] to completion on the calling thread.
///
/// The page fetch is the only place a QuerySet waits; everything else is
/// in-memory work, so blocking there is all the async support it needs.
#[derive(Debug)]
pub struct BlockingSource<S> {
    inner: S,
}

impl<S: AsyncRecordSource> BlockingSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: AsyncRecordSource> RecordSource for BlockingSource<S> {
    fn fetch_page(&self, request: &PageRequest) -> Result<ListResponse, SourceError> {
        futures::executor::block_on(AsyncRecordSource::fetch_page(&self.inner, request))
    }
}
