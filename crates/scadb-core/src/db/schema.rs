//! Module: db::schema
//! Responsibility: the fixed SCA table layout: which columns each read scope
//! exposes, and the two relations hanging off a check.
//! Does not own: row storage or query evaluation.

use crate::db::identity::{CheckId, PolicyId};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Identifier column of a check row.
pub const CHECK_ID_FIELD: &str = "id";

/// Back-reference column of compliance and rule rows.
pub const RELATION_ID_FIELD: &str = "id_check";

/// Policy column shared by policy and check rows.
pub const POLICY_ID_FIELD: &str = "policy_id";

pub const POLICY_FIELDS: &[&str] = &[
    "policy_id",
    "name",
    "description",
    "references",
    "pass",
    "fail",
    "invalid",
    "total_checks",
    "score",
    "hash_file",
    "start_scan",
    "end_scan",
];

pub const CHECK_FIELDS: &[&str] = &[
    "id",
    "policy_id",
    "title",
    "description",
    "rationale",
    "remediation",
    "references",
    "file",
    "directory",
    "process",
    "registry",
    "command",
    "condition",
    "result",
    "reason",
];

pub const COMPLIANCE_FIELDS: &[&str] = &["compliance.key", "compliance.value"];

pub const RULES_FIELDS: &[&str] = &["rules.type", "rules.rule"];

/// Columns of the joined check/compliance/rules view the resolver filters on.
pub const CHECK_VIEW_FIELDS: &[&str] = &[
    "id",
    "policy_id",
    "title",
    "description",
    "rationale",
    "remediation",
    "references",
    "file",
    "directory",
    "process",
    "registry",
    "command",
    "condition",
    "result",
    "reason",
    "compliance.key",
    "compliance.value",
    "rules.type",
    "rules.rule",
];

///
/// TableScope
///
/// The read shape a partition query targets.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TableScope {
    /// Policy summaries of the partition.
    Policies,

    /// Distinct check ids of one policy, matched against the joined view.
    CheckIds { policy_id: PolicyId },

    /// Full check rows for an explicit identifier set.
    Checks { ids: Vec<CheckId> },
}

impl TableScope {
    /// Columns a query against this scope may reference.
    #[must_use]
    pub const fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Policies => POLICY_FIELDS,
            Self::CheckIds { .. } => CHECK_VIEW_FIELDS,
            Self::Checks { .. } => CHECK_FIELDS,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ScopeKind {
        match self {
            Self::Policies => ScopeKind::Policies,
            Self::CheckIds { .. } => ScopeKind::CheckIds,
            Self::Checks { .. } => ScopeKind::Checks,
        }
    }
}

///
/// ScopeKind
///
/// Payload-free scope label used by diagnostics and validation errors.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScopeKind {
    Policies,
    CheckIds,
    Checks,
}

impl ScopeKind {
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Policies => POLICY_FIELDS,
            Self::CheckIds => CHECK_VIEW_FIELDS,
            Self::Checks => CHECK_FIELDS,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Policies => "sca_policy",
            Self::CheckIds => "sca_check_view",
            Self::Checks => "sca_check",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// RelationError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RelationError {
    #[error("unknown relation '{name}'; expected 'compliance' or 'rules'")]
    UnknownRelation { name: String },
}

///
/// Relation
///
/// The two tables related many-to-one to a check through `id_check`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Relation {
    Compliance,
    Rules,
}

impl Relation {
    pub const ALL: [Self; 2] = [Self::Compliance, Self::Rules];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Compliance => "compliance",
            Self::Rules => "rules",
        }
    }

    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Compliance => "sca_check_compliance",
            Self::Rules => "sca_check_rules",
        }
    }

    /// Qualified columns carried by rows of this relation, besides `id_check`.
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Compliance => COMPLIANCE_FIELDS,
            Self::Rules => RULES_FIELDS,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Relation {
    type Err = RelationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "compliance" | "sca_check_compliance" => Ok(Self::Compliance),
            "rules" | "sca_check_rules" => Ok(Self::Rules),
            _ => Err(RelationError::UnknownRelation {
                name: name.to_string(),
            }),
        }
    }
}
