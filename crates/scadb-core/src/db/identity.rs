//! Module: db::identity
//! Responsibility: typed identifiers for endpoints, policies, and checks.
//! Does not own: endpoint existence, which belongs to [`KnownEndpoints`].

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

///
/// EndpointId
///
/// Opaque identifier naming one endpoint's data partition.
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EndpointId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

///
/// PolicyId
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct PolicyId(String);

impl PolicyId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PolicyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

///
/// CheckId
///
/// Numeric check identifier, unique within one endpoint partition.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct CheckId(i64);

impl CheckId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

///
/// KnownEndpoints
///
/// Directory of endpoints whose partitions may be queried.
///

pub trait KnownEndpoints: Send + Sync {
    fn contains(&self, endpoint: &EndpointId) -> bool;
}

impl KnownEndpoints for BTreeSet<EndpointId> {
    fn contains(&self, endpoint: &EndpointId) -> bool {
        Self::contains(self, endpoint)
    }
}

impl KnownEndpoints for HashSet<EndpointId> {
    fn contains(&self, endpoint: &EndpointId) -> bool {
        Self::contains(self, endpoint)
    }
}
