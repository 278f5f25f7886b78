//! Runtime configuration for QuerySets.

use serde::Deserialize;

use crate::query::cache::MemoryCacheConfig;
use crate::query::error::QueryError;

/// Page size used when no other is configured.
pub const DEFAULT_REQUEST_LIMIT: usize = 10;

/// Configuration shared by all QuerySets a [`crate::Manager`] hands out.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuerySetConfig {
    /// Records requested per page.
    pub request_limit: usize,
    /// Records each new memory cache reserves room for.
    pub cache_capacity: usize,
}

impl Default for QuerySetConfig {
    fn default() -> Self {
        Self {
            request_limit: DEFAULT_REQUEST_LIMIT,
            cache_capacity: 0,
        }
    }
}

impl QuerySetConfig {
    pub fn new(request_limit: usize) -> Self {
        Self {
            request_limit,
            ..Self::default()
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Parse a JSON config document; missing keys fall back to defaults.
    pub fn from_json(text: &str) -> Result<Self, QueryError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| QueryError::parse(text, format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.request_limit == 0 {
            return Err(QueryError::InvalidRequestLimit);
        }
        Ok(())
    }

    pub fn cache_config(&self) -> MemoryCacheConfig {
        MemoryCacheConfig {
            capacity: self.cache_capacity,
        }
    }
}
