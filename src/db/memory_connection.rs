//! In-process `RecordSource` over JSON collections.

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::db::async_connection::AsyncRecordSource;
use crate::db::connection::{ListResponse, PageRequest, RecordSource, SourceError};
use crate::query::filter_expression::{Filter, WireOperator};
use crate::query::sort_expression::SortDirection;

/// Evaluates filters, sorts and pagination against records held in memory.
///
/// By default every response carries the total count; `without_total_count`
/// makes it behave like a service that never reports one.
#[derive(Debug)]
pub struct MemorySource {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    report_total: bool,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            report_total: true,
        }
    }

    pub fn without_total_count(mut self) -> Self {
        self.report_total = false;
        self
    }

    /// Append records to `collection`.
    pub fn insert(
        &self,
        collection: impl Into<String>,
        records: impl IntoIterator<Item = Value>,
    ) -> Result<(), SourceError> {
        let mut guard = self
            .collections
            .write()
            .map_err(|_| SourceError::new("memory source lock poisoned"))?;
        guard.entry(collection.into()).or_default().extend(records);
        Ok(())
    }

    pub fn clear_collection(&self, collection: &str) -> Result<(), SourceError> {
        let mut guard = self
            .collections
            .write()
            .map_err(|_| SourceError::new("memory source lock poisoned"))?;
        guard.remove(collection);
        Ok(())
    }

    fn matches(record: &Value, filter: &Filter) -> Result<bool, SourceError> {
        let op = filter
            .translate()
            .map_err(|e| SourceError::new(e.to_string()))?;
        let field = record.get(&filter.field_name).unwrap_or(&Value::Null);
        let wanted = &filter.value;
        Ok(match op {
            WireOperator::Eq => values_equal(field, wanted),
            WireOperator::Ne => !values_equal(field, wanted),
            WireOperator::Gt => compare_same_kind(field, wanted) == Some(Ordering::Greater),
            WireOperator::Lt => compare_same_kind(field, wanted) == Some(Ordering::Less),
            WireOperator::In => wanted
                .as_array()
                .is_some_and(|choices| choices.iter().any(|c| values_equal(field, c))),
            WireOperator::IsNull => field.is_null(),
            WireOperator::IsNotNull => !field.is_null(),
        })
    }
}

impl RecordSource for MemorySource {
    fn fetch_page(&self, request: &PageRequest) -> Result<ListResponse, SourceError> {
        let guard = self
            .collections
            .read()
            .map_err(|_| SourceError::new("memory source lock poisoned"))?;
        let Some(all) = guard.get(&request.collection) else {
            return Ok(ListResponse::new(Vec::new(), self.report_total.then_some(0)));
        };

        let mut selected = Vec::new();
        for record in all {
            let mut keep = true;
            for filter in request.filters.iter() {
                if !Self::matches(record, filter)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                selected.push(record);
            }
        }

        selected.sort_by(|a, b| {
            for sort in request.sorts.iter() {
                let lhs = a.get(&sort.field_name).unwrap_or(&Value::Null);
                let rhs = b.get(&sort.field_name).unwrap_or(&Value::Null);
                let ord = match sort.direction {
                    SortDirection::Ascending => compare_values(lhs, rhs),
                    SortDirection::Descending => compare_values(rhs, lhs),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        let total = selected.len();
        let offset = request.pagination.start();
        let limit = request.pagination.limit.unwrap_or(usize::MAX);
        let records: Vec<Value> = selected
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        tracing::trace!(
            "[memory] fetch_page collection={} offset={} returned={} total={}",
            request.collection,
            offset,
            records.len(),
            total
        );
        Ok(ListResponse::new(records, self.report_total.then_some(total)))
    }
}

impl AsyncRecordSource for MemorySource {
    fn fetch_page(&self, request: &PageRequest) -> BoxFuture<'static, Result<ListResponse, SourceError>> {
        let result = RecordSource::fetch_page(self, request);
        async move { result }.boxed()
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Ordering of two values of the same JSON kind, `None` across kinds.
fn compare_same_kind(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order used for sorting: nulls first, then by kind, then by value.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    compare_same_kind(a, b).unwrap_or_else(|| kind_rank(a).cmp(&kind_rank(b)))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_same_kind(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}
