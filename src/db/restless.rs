//! Translation of restrictions into Flask-Restless list queries.
//!
//! A list request is `GET <base_url>/<collection>?q=<json>&results_per_page=<limit>`
//! where the `q` document carries filters, ordering and offset. Flask-Restless
//! reports how many records remain after the offset, so the total count is
//! rebuilt from `num_results` plus the requested offset.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::db::connection::{ListResponse, PageRequest, SourceError};
use crate::query::error::QueryError;
use crate::query::filter_expression::{Filter, Filters, WireOperator};
use crate::query::restrictions::Pagination;
use crate::query::sort_expression::{Sort, Sorts};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RestlessConfig {
    /// API root, e.g. `http://example.com/api`.
    pub base_url: String,
    /// Name of the page-size query parameter.
    pub results_per_page_param: String,
}

impl Default for RestlessConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            results_per_page_param: "results_per_page".to_string(),
        }
    }
}

impl RestlessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Builds Flask-Restless requests and reads its listing responses.
#[derive(Clone, Debug, Default)]
pub struct RestlessTranslator {
    config: RestlessConfig,
}

impl RestlessTranslator {
    pub fn new(config: RestlessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RestlessConfig {
        &self.config
    }

    /// Endpoint listing `collection`.
    pub fn list_url(&self, collection: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), collection)
    }

    fn wire_operator(op: WireOperator) -> &'static str {
        match op {
            WireOperator::Eq => "eq",
            WireOperator::Ne => "neq",
            WireOperator::Gt => "gt",
            WireOperator::Lt => "lt",
            WireOperator::In => "in",
            WireOperator::IsNull => "is_null",
            WireOperator::IsNotNull => "is_not_null",
        }
    }

    fn to_filter(filter: &Filter) -> Result<Value, QueryError> {
        let op = filter.translate()?;
        let mut obj = Map::new();
        obj.insert("name".into(), Value::String(filter.field_name.clone()));
        obj.insert("op".into(), Value::String(Self::wire_operator(op).into()));
        if !matches!(op, WireOperator::IsNull | WireOperator::IsNotNull) {
            obj.insert("val".into(), filter.value.clone());
        }
        Ok(Value::Object(obj))
    }

    fn to_sort(sort: &Sort) -> Value {
        json!({ "field": sort.field_name, "direction": sort.direction.as_str() })
    }

    /// The `q` document. Empty parts are left out; a zero offset is omitted.
    pub fn build_q(
        filters: &Filters,
        sorts: &Sorts,
        pagination: &Pagination,
    ) -> Result<Value, QueryError> {
        let filter_expr = filters
            .iter()
            .map(Self::to_filter)
            .collect::<Result<Vec<_>, _>>()?;
        let order_by: Vec<Value> = sorts.iter().map(Self::to_sort).collect();

        let mut q = Map::new();
        if !filter_expr.is_empty() {
            q.insert("filters".into(), json!([{ "and": filter_expr }]));
        }
        if !order_by.is_empty() {
            q.insert("order_by".into(), Value::Array(order_by));
        }
        if let Some(offset) = pagination.offset.filter(|o| *o > 0) {
            q.insert("offset".into(), json!(offset));
        }
        Ok(Value::Object(q))
    }

    /// Query-string parameters for a page request.
    pub fn build_query(&self, request: &PageRequest) -> Result<Vec<(String, String)>, QueryError> {
        let q = Self::build_q(&request.filters, &request.sorts, &request.pagination)?;
        tracing::debug!(
            "[restless] build_query collection={} q={}",
            request.collection,
            q
        );
        let mut params = vec![("q".to_string(), q.to_string())];
        if let Some(limit) = request.pagination.limit {
            params.push((self.config.results_per_page_param.clone(), limit.to_string()));
        }
        Ok(params)
    }

    /// Decode a raw HTTP answer. `204 No Content` yields `None`.
    pub fn parse_response(status: u16, body: &str) -> Result<Option<Value>, SourceError> {
        let parsed = if status == 204 {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(body)
                    .map_err(|e| SourceError::Decode(format!("Unable to parse JSON response: {}", e)))?,
            )
        };
        if status >= 400 {
            return Err(SourceError::Http {
                status,
                message: format!("HTTP error {}", status),
            });
        }
        Ok(parsed)
    }

    /// Total matching records: remaining count plus the offset asked for.
    /// `None` when the response has no `num_results`.
    pub fn total_count(body: &Value, pagination: &Pagination) -> Result<Option<usize>, SourceError> {
        let Some(raw) = body.get("num_results") else {
            return Ok(None);
        };
        let remaining = raw
            .as_u64()
            .ok_or_else(|| SourceError::Decode(format!("num_results is not a count: {}", raw)))?;
        let remaining = usize::try_from(remaining)
            .map_err(|_| SourceError::Decode(format!("num_results too large: {}", remaining)))?;
        if remaining == 0 {
            return Ok(Some(0));
        }
        Ok(Some(remaining + pagination.start()))
    }

    /// Turn a listing body into a page of records.
    pub fn parse_list_response(body: &Value, pagination: &Pagination) -> Result<ListResponse, SourceError> {
        let records = body
            .get("objects")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| SourceError::Decode("listing response has no 'objects' array".into()))?;
        let total_count = Self::total_count(body, pagination)?;
        Ok(ListResponse::new(records, total_count))
    }
}
