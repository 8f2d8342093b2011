#![allow(dead_code)]

use scadb::prelude::*;
use scadb::core::db::{
    schema::{Relation, TableScope},
    query::StoreQuery,
    store::{Partition, QueryPage, StoreError},
};
use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicUsize, Ordering},
};

pub const POLICY: &str = "cis_debian10";

pub fn check(id: i64, title: &str, result: &str) -> Row {
    Row::new()
        .with("id", id)
        .with("policy_id", POLICY)
        .with("title", title)
        .with("result", result)
}

pub fn policy(policy_id: &str, name: &str, pass: i64, fail: i64) -> Row {
    Row::new()
        .with("policy_id", policy_id)
        .with("name", name)
        .with("pass", pass)
        .with("fail", fail)
}

/// Endpoints `001` and `002` share the policy; `003` has none.
pub fn store() -> MemoryStore {
    let first = MemoryPartition::new()
        .policy(policy(POLICY, "CIS Debian 10", 1, 1))
        .check(check(1, "Ensure /tmp is a separate partition", "failed"))
        .check(check(2, "Ensure sshd is configured", "passed"))
        .compliance(CheckId::new(1), "pci_dss", "2.2.4")
        .compliance(CheckId::new(1), "cis", "1.1.2")
        .rule(CheckId::new(2), "file", "f:/etc/ssh/sshd_config");

    let second = MemoryPartition::new()
        .policy(policy(POLICY, "CIS Debian 10", 0, 1))
        .check(check(7, "Ensure auditd is installed", "failed"))
        .compliance(CheckId::new(7), "pci_dss", "10.2.1");

    MemoryStore::new()
        .with_endpoint("001", first)
        .with_endpoint("002", second)
        .with_endpoint("003", MemoryPartition::new())
}

pub fn endpoints(ids: &[&str]) -> BTreeSet<EndpointId> {
    ids.iter().copied().map(EndpointId::from).collect()
}

pub fn ids(items: &[EnrichedCheck]) -> Vec<i64> {
    items.iter().filter_map(|c| c.id().map(CheckId::get)).collect()
}

///
/// CountingStore
///
/// Store double counting partition opens and calls per scope.
///

#[derive(Default)]
pub struct Calls {
    pub opens: AtomicUsize,
    pub policies: AtomicUsize,
    pub check_ids: AtomicUsize,
    pub checks: AtomicUsize,
    pub relational: AtomicUsize,
}

pub fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

pub struct CountingStore<S> {
    pub inner: S,
    pub calls: Calls,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Calls::default(),
        }
    }
}

impl<S: PartitionStore> PartitionStore for CountingStore<S> {
    fn open(&self, endpoint: &EndpointId) -> Result<Box<dyn Partition + '_>, StoreError> {
        self.calls.opens.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.open(endpoint)?;

        Ok(Box::new(CountingPartition {
            inner,
            calls: &self.calls,
        }))
    }
}

struct CountingPartition<'a> {
    inner: Box<dyn Partition + 'a>,
    calls: &'a Calls,
}

impl Partition for CountingPartition<'_> {
    fn run_query(&self, scope: &TableScope, query: &StoreQuery) -> Result<QueryPage, StoreError> {
        let counter = match scope {
            TableScope::Policies => &self.calls.policies,
            TableScope::CheckIds { .. } => &self.calls.check_ids,
            TableScope::Checks { .. } => &self.calls.checks,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        self.inner.run_query(scope, query)
    }

    fn run_relational_lookup(
        &self,
        relation: Relation,
        ids: &[CheckId],
    ) -> Result<Vec<Row>, StoreError> {
        self.calls.relational.fetch_add(1, Ordering::SeqCst);

        self.inner.run_relational_lookup(relation, ids)
    }
}

///
/// DenyList
///

pub struct DenyList(pub BTreeSet<String>);

impl DenyList {
    pub fn endpoints(ids: &[&str]) -> Self {
        Self(ids.iter().map(|id| format!("agent:id:{id}")).collect())
    }
}

impl Authorizer for DenyList {
    fn is_allowed(&self, action: &str, resource: &str) -> bool {
        action == "sca:read" && !self.0.contains(resource)
    }
}
