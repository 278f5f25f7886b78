//! Sort restrictions and the `field` / `-field` expression syntax.

use std::fmt;

use crate::query::error::QueryError;

/// Leading marker for descending order.
pub const DESCENDING_MARKER: char = '-';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Sort {
    pub field_name: String,
    pub direction: SortDirection,
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}", self.field_name),
            SortDirection::Descending => write!(f, "{}{}", DESCENDING_MARKER, self.field_name),
        }
    }
}

impl Sort {
    pub fn new(field_name: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field_name: field_name.into(),
            direction,
        }
    }

    /// Parse `field` (ascending) or `-field` (descending).
    pub fn parse(expr: &str) -> Result<Self, QueryError> {
        let chunks: Vec<&str> = expr.split(DESCENDING_MARKER).collect();
        match chunks.as_slice() {
            [field] if !field.is_empty() => Ok(Self::new(*field, SortDirection::Ascending)),
            ["", field] if !field.is_empty() => Ok(Self::new(*field, SortDirection::Descending)),
            [""] => Err(QueryError::parse(expr, "empty sort expression")),
            ["", ""] => Err(QueryError::parse(expr, "empty field name")),
            _ => Err(QueryError::parse(
                expr,
                format!("'{}' is only allowed as a leading marker", DESCENDING_MARKER),
            )),
        }
    }
}

/// Sort container: at most one direction per field.
///
/// Re-sorting a field replaces its entry in place, so the field keeps its
/// original precedence.
#[derive(Clone, Debug, Default)]
pub struct Sorts {
    data: Vec<Sort>,
}

impl PartialEq for Sorts {
    fn eq(&self, other: &Self) -> bool {
        self.data.len() == other.data.len() && self.data.iter().all(|s| other.data.contains(s))
    }
}

impl Sorts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_exprs<I, S>(exprs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorts = Self::new();
        sorts.apply(exprs)?;
        Ok(sorts)
    }

    /// Clear the container, then apply the expressions.
    pub fn make<I, S>(&mut self, exprs: I) -> Result<(), QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = Self::parse_all(exprs)?;
        self.data.clear();
        parsed.into_iter().for_each(|s| self.insert(s));
        Ok(())
    }

    /// Merge the expressions into the existing sorts.
    pub fn apply<I, S>(&mut self, exprs: I) -> Result<(), QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = Self::parse_all(exprs)?;
        parsed.into_iter().for_each(|s| self.insert(s));
        Ok(())
    }

    fn parse_all<I, S>(exprs: I) -> Result<Vec<Sort>, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        exprs.into_iter().map(|e| Sort::parse(e.as_ref())).collect()
    }

    pub fn insert(&mut self, sort: Sort) {
        match self.data.iter_mut().find(|s| s.field_name == sort.field_name) {
            Some(existing) => *existing = sort,
            None => self.data.push(sort),
        }
    }

    pub fn get(&self, field_name: &str) -> Option<&Sort> {
        self.data.iter().find(|s| s.field_name == field_name)
    }

    /// Sorts in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &Sort> {
        self.data.iter()
    }

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
