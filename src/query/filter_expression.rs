//! Filter restrictions and the `field__op=value` expression syntax.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::query::error::QueryError;

/// Delimiter between the field name and the operator token.
pub const FILTER_OPERATOR_DELIMITER: &str = "__";

/// Operators accepted in filter expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    In,
}

impl FilterOperator {
    /// Expression token, as in `age__gt`.
    pub fn token(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "eq",
            FilterOperator::NotEqual => "ne",
            FilterOperator::GreaterThan => "gt",
            FilterOperator::LessThan => "lt",
            FilterOperator::In => "in",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(FilterOperator::Equal),
            "ne" => Some(FilterOperator::NotEqual),
            "gt" => Some(FilterOperator::GreaterThan),
            "lt" => Some(FilterOperator::LessThan),
            "in" => Some(FilterOperator::In),
            _ => None,
        }
    }
}

/// Operator after translation for transport. Null comparisons get their own
/// operators since most backends cannot compare against NULL directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    In,
    IsNull,
    IsNotNull,
}

/// A single `field op value` restriction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub field_name: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl Hash for Filter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field_name.hash(state);
        self.operator.hash(state);
        // serde_json::Value has no Hash impl; its canonical text form does.
        self.value.to_string().hash(state);
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}={}",
            self.field_name,
            FILTER_OPERATOR_DELIMITER,
            self.operator.token(),
            self.value
        )
    }
}

impl Filter {
    pub fn new(field_name: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field_name: field_name.into(),
            operator,
            value: value.into(),
        }
    }

    /// Parse one `field__op` key with its value.
    pub fn parse(key: &str, value: Value) -> Result<Self, QueryError> {
        let expression = format!("{}={}", key, value);
        let chunks: Vec<&str> = key.split(FILTER_OPERATOR_DELIMITER).collect();
        let [field_name, token] = chunks.as_slice() else {
            return Err(QueryError::parse(
                expression,
                "expected exactly one 'field__op' delimiter",
            ));
        };
        if field_name.is_empty() {
            return Err(QueryError::parse(expression, "empty field name"));
        }
        let Some(operator) = FilterOperator::from_token(token) else {
            return Err(QueryError::parse(
                expression,
                format!("unknown operator '{}'", token),
            ));
        };

        Ok(Self {
            field_name: (*field_name).to_string(),
            operator,
            value,
        })
    }

    /// Operator to send over the wire. A null value only has meaning for
    /// equality checks.
    pub fn translate(&self) -> Result<WireOperator, QueryError> {
        if self.value.is_null() {
            return match self.operator {
                FilterOperator::Equal => Ok(WireOperator::IsNull),
                FilterOperator::NotEqual => Ok(WireOperator::IsNotNull),
                operator => Err(QueryError::Translation {
                    field: self.field_name.clone(),
                    operator,
                }),
            };
        }
        Ok(match self.operator {
            FilterOperator::Equal => WireOperator::Eq,
            FilterOperator::NotEqual => WireOperator::Ne,
            FilterOperator::GreaterThan => WireOperator::Gt,
            FilterOperator::LessThan => WireOperator::Lt,
            FilterOperator::In => WireOperator::In,
        })
    }
}

/// Filter container: field name to the set of filters on that field.
///
/// Several filters on one field are ANDed (`age__gt=10`, `age__lt=20`).
/// Identical filters collapse into one.
#[derive(Clone, Debug, Default)]
pub struct Filters {
    data: BTreeMap<String, Vec<Filter>>,
}

impl PartialEq for Filters {
    fn eq(&self, other: &Self) -> bool {
        self.data.len() == other.data.len()
            && self.data.iter().all(|(field, set)| {
                other.data.get(field).is_some_and(|theirs| {
                    set.len() == theirs.len() && set.iter().all(|f| theirs.contains(f))
                })
            })
    }
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a container from expressions.
    pub fn from_exprs<I, K, V>(exprs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut filters = Self::new();
        filters.apply(exprs)?;
        Ok(filters)
    }

    /// Clear the container, then apply the expressions.
    pub fn make<I, K, V>(&mut self, exprs: I) -> Result<(), QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let parsed = Self::parse_all(exprs)?;
        self.data.clear();
        parsed.into_iter().for_each(|f| self.insert(f));
        Ok(())
    }

    /// Add the expressions to the existing filters.
    ///
    /// Nothing is applied unless every expression parses.
    pub fn apply<I, K, V>(&mut self, exprs: I) -> Result<(), QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let parsed = Self::parse_all(exprs)?;
        parsed.into_iter().for_each(|f| self.insert(f));
        Ok(())
    }

    fn parse_all<I, K, V>(exprs: I) -> Result<Vec<Filter>, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        exprs
            .into_iter()
            .map(|(k, v)| Filter::parse(k.as_ref(), v.into()))
            .collect()
    }

    pub fn insert(&mut self, filter: Filter) {
        let set = self.data.entry(filter.field_name.clone()).or_default();
        if !set.contains(&filter) {
            set.push(filter);
        }
    }

    pub fn get(&self, field_name: &str) -> Option<&[Filter]> {
        self.data.get(field_name).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Every filter, grouped by field.
    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.data.values().flatten()
    }

    /// Number of filtered fields.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
