//! Explicit registry of model schemas.
//!
//! Built once at start-up by registering each [`Model`] and then passed to
//! whatever needs cross-model lookups, such as relation resolution. There is no
//! global state: two registries never see each other's models.

use std::collections::HashMap;

use crate::model::Model;
use crate::query::error::QueryError;

/// What the query layer needs to know about a registered model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    pub name: &'static str,
    pub collection: String,
    pub primary_key: &'static str,
}

impl ModelSchema {
    pub fn of<M: Model>() -> Self {
        Self {
            name: M::name(),
            collection: M::collection(),
            primary_key: M::primary_key(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    schemas: HashMap<&'static str, ModelSchema>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `M`. Registering the same model twice keeps the latest schema.
    pub fn register<M: Model>(&mut self) -> &mut Self {
        let schema = ModelSchema::of::<M>();
        tracing::debug!(
            "[registry] register model={} collection={} pk={}",
            schema.name,
            schema.collection,
            schema.primary_key
        );
        self.schemas.insert(schema.name, schema);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ModelSchema> {
        self.schemas.get(name)
    }

    pub fn schema(&self, name: &str) -> Result<&ModelSchema, QueryError> {
        self.get(name).ok_or_else(|| QueryError::UnknownModel {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
