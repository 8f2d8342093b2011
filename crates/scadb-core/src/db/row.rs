//! Module: db::row
//! Responsibility: dynamic row shape returned by store adapters, and the
//! typed records the enrichment merger builds from relational rows.
//! Boundary: rows are plain field maps; schema knowledge lives in `db::schema`.

use crate::{
    db::{identity::CheckId, schema::RELATION_ID_FIELD},
    error::InternalError,
    value::Value,
};
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Row
///
/// One row as produced by a partition query, keyed by column name.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Read a check identifier out of `field`.
    ///
    /// Adapters hand back identifiers as integers; anything else means the
    /// partition returned a malformed row.
    pub fn check_id(&self, field: &str) -> Result<CheckId, InternalError> {
        match self.0.get(field) {
            Some(Value::Int(id)) => Ok(CheckId::new(*id)),
            Some(other) => Err(InternalError::store_corruption(format!(
                "field '{field}' holds non-integer check id '{other}'"
            ))),
            None => Err(InternalError::store_corruption(format!(
                "row is missing check id field '{field}'"
            ))),
        }
    }

    /// Keep only the listed fields, in row order.
    #[must_use]
    pub fn project(mut self, fields: &[String]) -> Self {
        self.0.retain(|name, _| fields.iter().any(|f| f == name));
        self
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

///
/// QualifiedField
///
/// A column name split into its optional table qualifier and attribute.
/// `compliance.key` parses as `(Some("compliance"), "key")`; a bare name has
/// no qualifier. Only the first `.` separates, so the attribute keeps any
/// later dots.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QualifiedField<'a> {
    pub table: Option<&'a str>,
    pub field: &'a str,
}

impl<'a> QualifiedField<'a> {
    #[must_use]
    pub fn parse(name: &'a str) -> Self {
        match name.split_once('.') {
            Some((table, field)) if !table.is_empty() && !field.is_empty() => Self {
                table: Some(table),
                field,
            },
            _ => Self {
                table: None,
                field: name,
            },
        }
    }

    #[must_use]
    pub const fn is_qualified(&self) -> bool {
        self.table.is_some()
    }
}

///
/// RelationRecord
///
/// One compliance mapping or rule descriptor attached to a check, with
/// unqualified field names and no `id_check` back-reference.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RelationRecord(BTreeMap<String, Value>);

impl RelationRecord {
    /// Split a relational row into its owning check id and the record to attach.
    pub fn from_relational_row(row: Row) -> Result<(CheckId, Self), InternalError> {
        let id = row.check_id(RELATION_ID_FIELD)?;

        let fields = row
            .into_inner()
            .into_iter()
            .filter(|(name, _)| name != RELATION_ID_FIELD)
            .map(|(name, value)| (QualifiedField::parse(&name).field.to_string(), value))
            .collect();

        Ok((id, Self(fields)))
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl<K, V> FromIterator<(K, V)> for RelationRecord
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

///
/// EnrichedCheck
///
/// A check row with its compliance mappings and rule descriptors attached.
/// Serializes flat: the check's own columns plus `compliance` and `rules`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnrichedCheck {
    #[serde(flatten)]
    pub check: Row,
    pub compliance: Vec<RelationRecord>,
    pub rules: Vec<RelationRecord>,
}

impl EnrichedCheck {
    /// The check identifier, if the row carries a well-formed one.
    #[must_use]
    pub fn id(&self) -> Option<CheckId> {
        self.check
            .get(crate::db::schema::CHECK_ID_FIELD)
            .and_then(Value::as_int)
            .map(CheckId::new)
    }
}
