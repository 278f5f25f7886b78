//! Foreign-key style relations between models.
//!
//! A relation is followed by building an ordinary QuerySet on the target
//! model with one equality filter already applied.

use serde_json::Value;

use crate::model::{underscore, Model};
use crate::query::error::QueryError;
use crate::query::filter_expression::FILTER_OPERATOR_DELIMITER;
use crate::query::manager::Manager;
use crate::query::queryset::QuerySet;
use crate::registration::ModelRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// This record holds the target's key (`Order.customer`).
    ManyToOne,
    /// Target records hold this record's key (`Customer.orders`).
    OneToMany,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationKind,
    /// Model that declares the relation.
    pub from: &'static str,
    /// Target model name.
    pub to: &'static str,
    to_field: Option<String>,
}

impl Relation {
    pub fn many_to_one(from: &'static str, to: &'static str) -> Self {
        Self {
            kind: RelationKind::ManyToOne,
            from,
            to,
            to_field: None,
        }
    }

    pub fn one_to_many(from: &'static str, to: &'static str) -> Self {
        Self {
            kind: RelationKind::OneToMany,
            from,
            to,
            to_field: None,
        }
    }

    /// Use an explicit field on the target instead of the default.
    ///
    /// The name must be a plain field: not empty and free of the filter
    /// operator delimiter.
    pub fn with_to_field(mut self, field: impl Into<String>) -> Result<Self, QueryError> {
        let field = field.into();
        if field.is_empty() {
            return Err(QueryError::parse(field, "empty relation field name"));
        }
        if field.contains(FILTER_OPERATOR_DELIMITER) {
            return Err(QueryError::parse(
                field,
                format!("relation field name may not contain '{}'", FILTER_OPERATOR_DELIMITER),
            ));
        }
        self.to_field = Some(field);
        Ok(self)
    }

    /// Target field the equality filter applies to. Defaults to the target's
    /// primary key for many-to-one and `<from>_id` for one-to-many.
    pub fn to_field(&self, registry: &ModelRegistry) -> Result<String, QueryError> {
        let target = registry.schema(self.to)?;
        if let Some(field) = &self.to_field {
            return Ok(field.clone());
        }
        Ok(match self.kind {
            RelationKind::ManyToOne => target.primary_key.to_string(),
            RelationKind::OneToMany => format!("{}_id", underscore(self.from)),
        })
    }

    /// Related records whose `to_field` equals `value`.
    ///
    /// For many-to-one `value` is this record's foreign key, for one-to-many
    /// it is this record's primary key.
    pub fn queryset<M: Model>(
        &self,
        manager: &Manager<M>,
        registry: &ModelRegistry,
        value: impl Into<Value>,
    ) -> Result<QuerySet<M>, QueryError> {
        if M::name() != self.to {
            return Err(QueryError::RelationMismatch {
                expected: self.to,
                found: M::name(),
            });
        }
        let field = self.to_field(registry)?;
        manager.objects().filter([(format!("{}__eq", field), value.into())])
    }

    /// The single target of a many-to-one relation, if the source has it.
    pub fn fetch_one<M: Model>(
        &self,
        manager: &Manager<M>,
        registry: &ModelRegistry,
        value: impl Into<Value>,
    ) -> Result<Option<M>, QueryError> {
        let mut qs = self.queryset(manager, registry, value)?;
        match qs.get(0) {
            Ok(model) => Ok(Some(model)),
            Err(QueryError::IndexOutOfRange { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
