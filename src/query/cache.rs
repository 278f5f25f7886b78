//! Sparse page cache backing a QuerySet.
//!
//! Only the index ranges actually fetched are stored. Reading an index that was
//! never written yields [`EmptyCacheError`], which is how the QuerySet tells
//! "not fetched yet" apart from a record that is genuinely `null`.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// Size of the collection as far as the cache knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalCount {
    Exact(usize),
    /// The source did not report a count; more pages may exist until a short
    /// page shows up.
    Unbounded,
}

impl TotalCount {
    /// Whether `index` lies before the end of the collection.
    pub fn includes(&self, index: usize) -> bool {
        match self {
            TotalCount::Exact(n) => index < *n,
            TotalCount::Unbounded => true,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, TotalCount::Exact(0))
    }

    pub fn exact(&self) -> Option<usize> {
        match self {
            TotalCount::Exact(n) => Some(*n),
            TotalCount::Unbounded => None,
        }
    }
}

impl From<Option<usize>> for TotalCount {
    fn from(count: Option<usize>) -> Self {
        count.map_or(TotalCount::Unbounded, TotalCount::Exact)
    }
}

impl fmt::Display for TotalCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalCount::Exact(n) => write!(f, "{}", n),
            TotalCount::Unbounded => write!(f, "inf"),
        }
    }
}

/// Read of an index that was never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyCacheError {
    pub index: usize,
}

impl fmt::Display for EmptyCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cache has no record at index {}", self.index)
    }
}

impl std::error::Error for EmptyCacheError {}

/// Integer-indexed sparse record storage.
pub trait RecordCache: Send + Sync + fmt::Debug {
    fn read(&self, index: usize) -> Result<&Value, EmptyCacheError>;

    /// Cached records in `range`, in index order. Gaps are skipped.
    fn read_range(&self, range: Range<usize>) -> Vec<&Value>;

    /// Store `records` at `offset`, `offset + 1`, ...
    fn write_range(&mut self, offset: usize, records: Vec<Value>);

    fn contains(&self, index: usize) -> bool {
        self.read(index).is_ok()
    }

    /// `None` until the first page has been stored.
    fn total_count(&self) -> Option<TotalCount>;

    fn set_total_count(&mut self, count: TotalCount);

    /// Number of cached records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A new, empty cache of the same kind built with the same parameters.
    fn fresh(&self) -> Box<dyn RecordCache>;
}

/// Construction parameters of [`MemoryCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryCacheConfig {
    /// Number of records to reserve room for up front.
    pub capacity: usize,
}

/// In-process [`RecordCache`].
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: HashMap<usize, Value>,
    /// One past the highest written index.
    upper: usize,
    total_count: Option<TotalCount>,
    config: MemoryCacheConfig,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MemoryCacheConfig) -> Self {
        Self {
            entries: HashMap::with_capacity(config.capacity),
            upper: 0,
            total_count: None,
            config,
        }
    }

    pub fn config(&self) -> MemoryCacheConfig {
        self.config
    }
}

impl RecordCache for MemoryCache {
    fn read(&self, index: usize) -> Result<&Value, EmptyCacheError> {
        self.entries.get(&index).ok_or(EmptyCacheError { index })
    }

    fn read_range(&self, range: Range<usize>) -> Vec<&Value> {
        let end = range.end.min(self.upper);
        (range.start..end)
            .filter_map(|i| self.entries.get(&i))
            .collect()
    }

    fn write_range(&mut self, offset: usize, records: Vec<Value>) {
        let written = records.len();
        for (i, record) in records.into_iter().enumerate() {
            self.entries.insert(offset + i, record);
        }
        if written > 0 {
            self.upper = self.upper.max(offset + written);
        }
        tracing::trace!("[cache] stored {} records at offset {}", written, offset);
    }

    fn total_count(&self) -> Option<TotalCount> {
        self.total_count
    }

    fn set_total_count(&mut self, count: TotalCount) {
        self.total_count = Some(count);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn fresh(&self) -> Box<dyn RecordCache> {
        Box::new(MemoryCache::with_config(self.config))
    }
}

/// Produces the cache each new QuerySet starts with.
pub trait Cacher: Send + Sync + fmt::Debug {
    fn new_cache(&self) -> Box<dyn RecordCache>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCacher {
    config: MemoryCacheConfig,
}

impl MemoryCacher {
    pub fn new(config: MemoryCacheConfig) -> Self {
        Self { config }
    }
}

impl Cacher for MemoryCacher {
    fn new_cache(&self) -> Box<dyn RecordCache> {
        Box::new(MemoryCache::with_config(self.config))
    }
}
