//! Iterators over a QuerySet.
//!
//! [`Iter`] walks the collection from offset 0, fetching a page whenever it
//! reaches an uncached page boundary. A miss inside a page the exact count
//! covers (after a page size change, or around a page cached at an unaligned
//! offset) fetches the page holding that index. It stops at the known total
//! count, or at the first index a fetch did not fill (a short or empty page). Both
//! [`ModelIter`] and [`ValuesIter`] are this iterator; they only differ in what
//! they hand out for each record.
//!
//! Items are `Result`s: a failed fetch is yielded once as `Err` and ends the
//! pass.

use std::iter::FusedIterator;

use crate::model::{Materialize, Models, Values};
use crate::query::cache::TotalCount;
use crate::query::error::QueryError;
use crate::query::queryset::QuerySet;

pub type ModelIter<'a, M> = Iter<'a, M, Models>;
pub type ValuesIter<'a, M> = Iter<'a, M, Values>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Advancing,
    Exhausted,
}

pub struct Iter<'a, M, R> {
    qs: &'a mut QuerySet<M, R>,
    offset: usize,
    state: State,
}

impl<'a, M, R> Iter<'a, M, R>
where
    R: Materialize<M>,
{
    pub(crate) fn new(qs: &'a mut QuerySet<M, R>) -> Self {
        Self {
            qs,
            offset: 0,
            state: State::Advancing,
        }
    }

    /// Logical position of the next record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn within_total(&self) -> bool {
        self.qs
            .known_total()
            .map_or(true, |total| total.includes(self.offset))
    }

    fn counted_miss(&self) -> bool {
        matches!(
            self.qs.known_total(),
            Some(total @ TotalCount::Exact(_)) if total.includes(self.offset)
        ) && self.qs.cached(self.offset).is_none()
    }

    fn finish(&mut self) -> Option<Result<R::Item, QueryError>> {
        tracing::trace!("[iter] exhausted at offset {}", self.offset);
        self.state = State::Exhausted;
        None
    }
}

impl<M, R> Iterator for Iter<'_, M, R>
where
    R: Materialize<M>,
{
    type Item = Result<R::Item, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Exhausted {
            return None;
        }

        let at_boundary = self.offset % self.qs.request_limit() == 0;
        let fetched = if at_boundary && self.within_total() && self.qs.cached(self.offset).is_none() {
            self.qs.cache_page(self.offset)
        } else if self.counted_miss() {
            // An unbounded total never gets here: a gap there is a short page.
            self.qs.resolve(self.offset).map(|_| ())
        } else {
            Ok(())
        };
        if let Err(e) = fetched {
            self.state = State::Exhausted;
            return Some(Err(e));
        }

        if !self.within_total() {
            return self.finish();
        }
        let Some(raw) = self.qs.cached(self.offset) else {
            return self.finish();
        };
        let item = R::produce(raw);
        self.offset += 1;
        Some(item)
    }
}

impl<M, R> FusedIterator for Iter<'_, M, R> where R: Materialize<M> {}

/// Lazy `[start:stop:step]` sequence produced by [`QuerySet::slice`].
///
/// Runs while the index is below both the count and `stop`. A cache miss
/// fetches the page holding the index and retries once; if the record is
/// still missing the sequence ends early.
pub struct Slice<'a, M, R> {
    qs: &'a mut QuerySet<M, R>,
    next: usize,
    stop: Option<usize>,
    step: usize,
    done: bool,
}

impl<'a, M, R> Slice<'a, M, R>
where
    R: Materialize<M>,
{
    pub(crate) fn new(
        qs: &'a mut QuerySet<M, R>,
        start: usize,
        stop: Option<usize>,
        step: usize,
    ) -> Self {
        Self {
            qs,
            next: start,
            stop,
            step,
            done: false,
        }
    }
}

impl<M, R> Iterator for Slice<'_, M, R>
where
    R: Materialize<M>,
{
    type Item = Result<R::Item, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.stop.is_some_and(|stop| self.next >= stop) {
            return None;
        }

        // The count may change while paging, so ask every time.
        let count = match self.qs.count() {
            Ok(count) => count,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        if !count.includes(self.next) {
            self.done = true;
            return None;
        }

        let index = self.next;
        let item = match self.qs.resolve(index) {
            Ok(Some(raw)) => R::produce(raw),
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        self.next = index.saturating_add(self.step);
        Some(item)
    }
}

impl<M, R> FusedIterator for Slice<'_, M, R> where R: Materialize<M> {}
