//! Defines the abstract `RecordSource` trait: the record-fetch contract.

use mockall::automock;
use serde_json::Value;
use std::fmt;

use crate::query::filter_expression::Filters;
use crate::query::restrictions::Pagination;
use crate::query::sort_expression::Sorts;

/// An error type for record-fetch operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// A general error with a message.
    General(String),
    /// The remote service answered with an error status.
    Http { status: u16, message: String },
    /// The remote payload could not be decoded.
    Decode(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::General(msg) => write!(f, "Source Error: {}", msg),
            SourceError::Http { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            SourceError::Decode(msg) => write!(f, "Unable to decode response: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

impl SourceError {
    /// Creates a new general error.
    pub fn new(msg: impl Into<String>) -> Self {
        SourceError::General(msg.into())
    }
}

/// One page fetch: which collection, under which restrictions.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub collection: String,
    pub filters: Filters,
    pub sorts: Sorts,
    pub pagination: Pagination,
}

/// Records returned by a page fetch.
///
/// `total_count` is the number of matching records across all pages, or `None`
/// when the backend does not report it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListResponse {
    pub records: Vec<Value>,
    pub total_count: Option<usize>,
}

impl ListResponse {
    pub fn new(records: Vec<Value>, total_count: Option<usize>) -> Self {
        Self {
            records,
            total_count,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Abstracts the remote collection a QuerySet pages through.
///
/// Implementations must return records already filtered, sorted and paginated
/// as requested, and must keep the order stable across pages for identical
/// restrictions. Errors are handed back to the caller untouched.
#[automock]
pub trait RecordSource: Send + Sync + fmt::Debug {
    fn fetch_page(&self, request: &PageRequest) -> Result<ListResponse, SourceError>;
}
