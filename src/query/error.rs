//! Errors raised by the query layer.

use std::fmt;

use crate::db::connection::SourceError;
use crate::query::cache::TotalCount;
use crate::query::filter_expression::FilterOperator;

/// An error type for QuerySet operations.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// A filter or sort expression has invalid syntax.
    Parse { expression: String, reason: String },
    /// A null value was combined with an operator that has no null form.
    Translation {
        field: String,
        operator: FilterOperator,
    },
    /// An explicit index is at or past the collection's count.
    IndexOutOfRange { index: usize, count: TotalCount },
    /// Remote pagination cannot address from the end.
    NegativeIndex { value: isize },
    /// Slice steps must be positive.
    InvalidStep { step: isize },
    /// Page size must be at least one record.
    InvalidRequestLimit,
    /// A raw record could not be turned into a model.
    Materialize { model: &'static str, message: String },
    /// The model registry has no entry under this name.
    UnknownModel { name: String },
    /// A relation was followed with a model other than its target.
    RelationMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// The record source failed; the backend error is kept as-is.
    Source(SourceError),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Parse { expression, reason } => {
                write!(f, "Bad expression syntax '{}': {}", expression, reason)
            }
            QueryError::Translation { field, operator } => write!(
                f,
                "Cannot apply '{}' operation to NULL in filter on field '{}'",
                operator.token(),
                field
            ),
            QueryError::IndexOutOfRange { index, count } => {
                write!(f, "Index {} out of range (count {})", index, count)
            }
            QueryError::NegativeIndex { value } => {
                write!(f, "Negative indexing is not supported (got {})", value)
            }
            QueryError::InvalidStep { step } => {
                write!(f, "Slice step must be positive (got {})", step)
            }
            QueryError::InvalidRequestLimit => write!(f, "Request limit must be at least 1"),
            QueryError::Materialize { model, message } => {
                write!(f, "Cannot materialize '{}' record: {}", model, message)
            }
            QueryError::UnknownModel { name } => write!(f, "Model '{}' is not registered", name),
            QueryError::RelationMismatch { expected, found } => write!(
                f,
                "Relation points to '{}' but was followed as '{}'",
                expected, found
            ),
            QueryError::Source(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Source(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SourceError> for QueryError {
    fn from(err: SourceError) -> Self {
        QueryError::Source(err)
    }
}

impl QueryError {
    pub(crate) fn parse(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::Parse {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that originate in the record source.
    pub fn is_remote(&self) -> bool {
        matches!(self, QueryError::Source(_))
    }
}
