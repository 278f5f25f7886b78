//! The record-materialization contract.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::query::error::QueryError;

/// A typed domain object backed by one remote collection.
///
/// Records are decoded with `serde`, so field renames and defaults are
/// expressed with the usual `#[serde(...)]` attributes.
pub trait Model: DeserializeOwned + Send + Sync + 'static {
    /// A unique, stable name for this model. Typically the struct's name.
    fn name() -> &'static str;

    /// Remote collection path segment, `BlogPost` -> `blog_post` by default.
    fn collection() -> String {
        underscore(Self::name())
    }

    fn primary_key() -> &'static str {
        "id"
    }

    fn materialize(raw: Value) -> Result<Self, QueryError> {
        serde_json::from_value(raw).map_err(|e| QueryError::Materialize {
            model: Self::name(),
            message: e.to_string(),
        })
    }
}

/// How a QuerySet turns cached records into items.
pub trait Materialize<M> {
    type Item;

    fn produce(raw: &Value) -> Result<Self::Item, QueryError>;
}

/// Yield materialized models.
#[derive(Debug, Clone, Copy, Default)]
pub struct Models;

/// Yield raw records unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Values;

impl<M: Model> Materialize<M> for Models {
    type Item = M;

    fn produce(raw: &Value) -> Result<M, QueryError> {
        M::materialize(raw.clone())
    }
}

impl<M> Materialize<M> for Values {
    type Item = Value;

    fn produce(raw: &Value) -> Result<Value, QueryError> {
        Ok(raw.clone())
    }
}

/// `CamelCase` to `snake_case`.
pub fn underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}
