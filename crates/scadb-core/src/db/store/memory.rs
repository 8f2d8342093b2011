//! Module: store::memory
//! Responsibility: in-memory partitions holding the four SCA tables, with
//! the filter/search/sort/page semantics of the query layer.
//! Boundary: used by tests and embedders that hold assessment data in
//! process; production adapters front a real per-endpoint database.

use crate::db::{
    identity::{CheckId, EndpointId, PolicyId},
    query::{
        PageSpec, StoreQuery,
        predicate::{FieldPresence, RowView, eval, search_matches, sort_rows},
    },
    row::Row,
    schema::{CHECK_ID_FIELD, POLICY_ID_FIELD, RELATION_ID_FIELD, Relation, TableScope},
    store::{Partition, PartitionStore, QueryPage, StoreError},
};
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet};

///
/// MemoryPartition
///
/// Table contents for one endpoint. Relational rows are stored with their
/// qualified column names (`compliance.key`, `rules.type`, ...).
///

#[derive(Clone, Debug, Default)]
pub struct MemoryPartition {
    policies: Vec<Row>,
    checks: Vec<Row>,
    compliance: Vec<Row>,
    rules: Vec<Row>,
}

impl MemoryPartition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn policy(mut self, row: Row) -> Self {
        self.policies.push(row);
        self
    }

    #[must_use]
    pub fn check(mut self, row: Row) -> Self {
        self.checks.push(row);
        self
    }

    #[must_use]
    pub fn compliance(
        mut self,
        id: CheckId,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Self {
        self.compliance.push(
            Row::new()
                .with(RELATION_ID_FIELD, id.get())
                .with("compliance.key", key)
                .with("compliance.value", value),
        );
        self
    }

    #[must_use]
    pub fn rule(mut self, id: CheckId, kind: impl Into<Value>, rule: impl Into<Value>) -> Self {
        self.rules.push(
            Row::new()
                .with(RELATION_ID_FIELD, id.get())
                .with("rules.type", kind)
                .with("rules.rule", rule),
        );
        self
    }

    /// Insert a raw relational row, bypassing the column layout helpers.
    #[must_use]
    pub fn relation_row(mut self, relation: Relation, row: Row) -> Self {
        match relation {
            Relation::Compliance => self.compliance.push(row),
            Relation::Rules => self.rules.push(row),
        }
        self
    }

    fn relation_rows(&self, relation: Relation) -> &[Row] {
        match relation {
            Relation::Compliance => &self.compliance,
            Relation::Rules => &self.rules,
        }
    }

    fn related(&self, relation: Relation, id: CheckId) -> Vec<&Row> {
        self.relation_rows(relation)
            .iter()
            .filter(|row| row_check_id(row, RELATION_ID_FIELD) == Some(id))
            .collect()
    }
}

///
/// MemoryStore
///

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    partitions: BTreeMap<EndpointId, MemoryPartition>,
    offline: BTreeSet<EndpointId>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the partition for `endpoint`.
    #[must_use]
    pub fn with_endpoint(
        mut self,
        endpoint: impl Into<EndpointId>,
        partition: MemoryPartition,
    ) -> Self {
        self.partitions.insert(endpoint.into(), partition);
        self
    }

    /// Mark a partition as unreachable; opening it fails until cleared.
    pub fn set_offline(&mut self, endpoint: impl Into<EndpointId>, offline: bool) {
        let endpoint = endpoint.into();
        if offline {
            self.offline.insert(endpoint);
        } else {
            self.offline.remove(&endpoint);
        }
    }
}

impl PartitionStore for MemoryStore {
    fn open(&self, endpoint: &EndpointId) -> Result<Box<dyn Partition + '_>, StoreError> {
        if self.offline.contains(endpoint) {
            return Err(StoreError::unavailable(endpoint, "partition is offline"));
        }

        let data = self
            .partitions
            .get(endpoint)
            .ok_or_else(|| StoreError::unavailable(endpoint, "no partition registered"))?;

        Ok(Box::new(MemoryHandle { data }))
    }
}

///
/// MemoryHandle
///

struct MemoryHandle<'a> {
    data: &'a MemoryPartition,
}

impl MemoryHandle<'_> {
    fn policies(&self, query: &StoreQuery) -> QueryPage {
        let mut rows: Vec<Row> = self
            .data
            .policies
            .iter()
            .filter(|row| matches(*row, query))
            .cloned()
            .collect();

        if let Some(sort) = &query.sort {
            sort_rows(&mut rows, sort);
        }

        let total = rows.len() as u64;
        let mut rows = paginate(rows, query.page);
        if let Some(select) = &query.select {
            rows = rows.into_iter().map(|row| row.project(select)).collect();
        }

        QueryPage { rows, total }
    }

    // A check matches when any row of its left join with compliance and
    // rules matches; each check is reported once.
    fn check_ids(&self, policy_id: &PolicyId, query: &StoreQuery) -> QueryPage {
        let policy = Value::from(policy_id.as_str());

        let mut ids: Vec<CheckId> = self
            .data
            .checks
            .iter()
            .filter(|check| check.get(POLICY_ID_FIELD) == Some(&policy))
            .filter(|check| self.joined_matches(check, query))
            .filter_map(|check| row_check_id(check, CHECK_ID_FIELD))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let total = ids.len() as u64;
        let rows = paginate(ids, query.page)
            .into_iter()
            .map(|id| Row::new().with(CHECK_ID_FIELD, id.get()))
            .collect();

        QueryPage { rows, total }
    }

    fn joined_matches(&self, check: &Row, query: &StoreQuery) -> bool {
        let id = row_check_id(check, CHECK_ID_FIELD);
        let (compliance, rules) = match id {
            Some(id) => (
                self.data.related(Relation::Compliance, id),
                self.data.related(Relation::Rules, id),
            ),
            None => (Vec::new(), Vec::new()),
        };

        let compliance = left_join_side(&compliance);
        let rules = left_join_side(&rules);

        compliance.iter().any(|c| {
            rules.iter().any(|r| {
                let view = JoinedCheck {
                    check,
                    compliance: *c,
                    rule: *r,
                };
                matches(&view, query)
            })
        })
    }

    fn checks(&self, ids: &[CheckId], query: &StoreQuery) -> QueryPage {
        let wanted: BTreeSet<CheckId> = ids.iter().copied().collect();

        let mut rows: Vec<Row> = self
            .data
            .checks
            .iter()
            .filter(|row| {
                row_check_id(row, CHECK_ID_FIELD).is_some_and(|id| wanted.contains(&id))
            })
            .filter(|row| matches(*row, query))
            .cloned()
            .collect();

        if let Some(sort) = &query.sort {
            sort_rows(&mut rows, sort);
        }

        let total = rows.len() as u64;
        QueryPage {
            rows: paginate(rows, query.page),
            total,
        }
    }
}

impl Partition for MemoryHandle<'_> {
    fn run_query(&self, scope: &TableScope, query: &StoreQuery) -> Result<QueryPage, StoreError> {
        Ok(match scope {
            TableScope::Policies => self.policies(query),
            TableScope::CheckIds { policy_id } => self.check_ids(policy_id, query),
            TableScope::Checks { ids } => self.checks(ids, query),
        })
    }

    fn run_relational_lookup(
        &self,
        relation: Relation,
        ids: &[CheckId],
    ) -> Result<Vec<Row>, StoreError> {
        let wanted: BTreeSet<CheckId> = ids.iter().copied().collect();

        Ok(self
            .data
            .relation_rows(relation)
            .iter()
            .filter(|row| {
                row_check_id(row, RELATION_ID_FIELD).is_some_and(|id| wanted.contains(&id))
            })
            .cloned()
            .collect())
    }
}

///
/// JoinedCheck
///
/// One row of the check ⟕ compliance ⟕ rules view. Qualified names read
/// from the matching side; everything else reads from the check.
///

struct JoinedCheck<'a> {
    check: &'a Row,
    compliance: Option<&'a Row>,
    rule: Option<&'a Row>,
}

impl RowView for JoinedCheck<'_> {
    fn field(&self, name: &str) -> FieldPresence<'_> {
        let side = if name.starts_with("compliance.") {
            self.compliance
        } else if name.starts_with("rules.") {
            self.rule
        } else {
            Some(self.check)
        };

        side.and_then(|row| row.get(name))
            .map_or(FieldPresence::Missing, FieldPresence::Present)
    }
}

fn left_join_side<'a>(rows: &[&'a Row]) -> Vec<Option<&'a Row>> {
    if rows.is_empty() {
        vec![None]
    } else {
        rows.iter().map(|row| Some(*row)).collect()
    }
}

fn matches<R: RowView + ?Sized>(row: &R, query: &StoreQuery) -> bool {
    query.predicate.as_ref().is_none_or(|p| eval(row, p))
        && query.search.as_ref().is_none_or(|s| search_matches(row, s))
}

fn paginate<T>(items: Vec<T>, page: Option<PageSpec>) -> Vec<T> {
    match page {
        Some(page) => page.apply(items),
        None => items,
    }
}

fn row_check_id(row: &Row, field: &str) -> Option<CheckId> {
    row.get(field).and_then(Value::as_int).map(CheckId::new)
}
