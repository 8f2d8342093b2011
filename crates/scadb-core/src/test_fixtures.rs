use crate::{
    config::ScaConfig,
    db::{
        identity::{CheckId, EndpointId},
        row::Row,
        store::{MemoryPartition, MemoryStore},
    },
};
use std::collections::BTreeSet;

pub(crate) const AGENT: &str = "001";
pub(crate) const POLICY: &str = "cis_debian10";

pub(crate) fn check_row(id: i64, policy: &str, title: &str, result: &str) -> Row {
    Row::new()
        .with("id", id)
        .with("policy_id", policy)
        .with("title", title)
        .with("result", result)
}

pub(crate) fn policy_row(policy: &str, name: &str, pass: i64, fail: i64) -> Row {
    Row::new()
        .with("policy_id", policy)
        .with("name", name)
        .with("pass", pass)
        .with("fail", fail)
        .with("total_checks", pass + fail)
}

/// Endpoint `001` with two policies; `cis_debian10` owns checks 3000..=3004.
///
/// - 3000: two compliance rows, one rule
/// - 3001: one compliance row, no rules
/// - 3002: no relations at all
/// - 3003: one rule, no compliance
/// - 3004: failed check with pci_dss compliance
pub(crate) fn sample_partition() -> MemoryPartition {
    MemoryPartition::new()
        .policy(policy_row(POLICY, "CIS benchmark for Debian/Linux 10", 3, 2))
        .policy(policy_row("sca_unix_audit", "System audit for Unix", 10, 0))
        .check(check_row(3000, POLICY, "Ensure /tmp is a separate partition", "failed"))
        .check(check_row(3001, POLICY, "Ensure nodev option set on /tmp", "passed"))
        .check(check_row(3002, POLICY, "Ensure nosuid option set on /tmp", "passed"))
        .check(check_row(3003, POLICY, "Ensure noexec option set on /tmp", "passed"))
        .check(check_row(3004, POLICY, "Ensure auditd is installed", "failed"))
        .check(check_row(4000, "sca_unix_audit", "Ensure SSH root login is disabled", "passed"))
        .compliance(CheckId::new(3000), "cis", "1.1.2")
        .compliance(CheckId::new(3000), "pci_dss", "2.2.4")
        .rule(CheckId::new(3000), "command", "c:mount -> r:\\s/tmp\\s")
        .compliance(CheckId::new(3001), "cis", "1.1.3")
        .rule(CheckId::new(3003), "command", "c:mount -> r:noexec")
        .compliance(CheckId::new(3004), "pci_dss", "10.2.1")
        .compliance(CheckId::new(4000), "cis", "5.2.8")
}

pub(crate) fn sample_store() -> MemoryStore {
    MemoryStore::new().with_endpoint(AGENT, sample_partition())
}

pub(crate) fn known(endpoints: &[&str]) -> BTreeSet<EndpointId> {
    endpoints.iter().copied().map(EndpointId::from).collect()
}

pub(crate) fn config(parallel: bool) -> ScaConfig {
    let mut config = ScaConfig::default();
    config.fetch.parallel = parallel;
    config
}
