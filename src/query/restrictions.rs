use serde::{Deserialize, Serialize};

use crate::query::filter_expression::Filters;
use crate::query::sort_expression::Sorts;

/// Offset/limit window of a list request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl Pagination {
    pub fn new(offset: Option<usize>, limit: Option<usize>) -> Self {
        Self { offset, limit }
    }

    /// Window of `limit` records starting at `offset`.
    pub fn window(offset: usize, limit: usize) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    /// Offset, treating an absent one as the start of the collection.
    pub fn start(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// Filters, sorts and pagination taken together. Two bundles are equal only
/// when all three parts are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Restrictions {
    pub filters: Filters,
    pub sorts: Sorts,
    pub pagination: Pagination,
}

impl Restrictions {
    pub fn new(filters: Filters, sorts: Sorts, pagination: Pagination) -> Self {
        Self {
            filters,
            sorts,
            pagination,
        }
    }
}
