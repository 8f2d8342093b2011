//! Module: db::query
//! Responsibility: caller-facing read shape (`QuerySpec`) and its compiled,
//! schema-validated form (`StoreQuery`) handed to store adapters.
//! Does not own: evaluation against rows (see `predicate`) or storage.

mod compile;
pub mod predicate;


use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

// re-exports
pub(crate) use compile::QueryCompiler;
pub use predicate::Predicate;

///
/// QueryError
///
/// Caller-remediable problems with a read shape.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("unknown field '{field}' for {scope}")]
    UnknownField { scope: &'static str, field: String },

    #[error("invalid query at position {position}: {reason}")]
    Parse { position: usize, reason: String },

    #[error("limit must be between 1 and {max}, got {limit}")]
    LimitOutOfRange { limit: u32, max: u32 },

    #[error("{what} field list must not be empty")]
    EmptyFieldList { what: &'static str },
}

///
/// SortOrder
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

///
/// SortSpec
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SortSpec {
    pub fields: Vec<String>,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    #[must_use]
    pub fn asc<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            order: SortOrder::Asc,
        }
    }

    #[must_use]
    pub fn desc<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            order: SortOrder::Desc,
        }
    }
}

///
/// SearchSpec
///
/// Free-text search. An empty `fields` list searches every column of the
/// target scope; compilation fills it in.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SearchSpec {
    pub value: String,
    #[serde(default)]
    pub negation: bool,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl SearchSpec {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            negation: false,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub const fn negated(mut self) -> Self {
        self.negation = true;
        self
    }

    #[must_use]
    pub fn in_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

///
/// FilterValue
///
/// Right-hand side of a filter entry: one value, or any of several.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Any(Vec<Value>),
    One(Value),
}

impl FilterValue {
    #[must_use]
    pub fn any<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Any(values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        Self::One(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::One(value.into())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::One(value.into())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::One(value.into())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::One(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::One(value.into())
    }
}

///
/// QuerySpec
///
/// The caller-supplied read shape. Every part is optional; an absent part
/// places no constraint on the read.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct QuerySpec {
    pub q: Option<String>,
    pub offset: u32,
    pub limit: Option<u32>,
    pub sort: Option<SortSpec>,
    pub search: Option<SearchSpec>,
    pub select: Option<Vec<String>>,
    pub filters: BTreeMap<String, FilterValue>,
}

impl QuerySpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn search(mut self, search: SearchSpec) -> Self {
        self.search = Some(search);
        self
    }

    #[must_use]
    pub fn select<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Add a filter entry, replacing any previous entry for the same field.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }
}

///
/// PageSpec
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageSpec {
    pub offset: u32,
    pub limit: u32,
}

impl PageSpec {
    /// Apply the window to an already-ordered sequence.
    pub fn apply<T>(self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

///
/// StoreQuery
///
/// A validated query ready for an adapter. Every field reference has been
/// checked against the target scope, and search fields are always explicit.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StoreQuery {
    pub predicate: Option<Predicate>,
    pub search: Option<SearchSpec>,
    pub sort: Option<SortSpec>,
    pub page: Option<PageSpec>,
    pub select: Option<Vec<String>>,
}
