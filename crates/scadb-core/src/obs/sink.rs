//! Metrics sink boundary.
//!
//! Executor logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between execution logic
//! and the thread-local metrics state.
use crate::{
    db::schema::{Relation, ScopeKind},
    obs::metrics,
};
use std::{cell::RefCell, rc::Rc, time::Instant};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Policies,
    Checks,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    ExecStart {
        kind: ExecKind,
        endpoint: &'a str,
    },
    ExecFinish {
        kind: ExecKind,
        endpoint: &'a str,
        rows_returned: u64,
        elapsed_us: u64,
    },
    PartitionQuery {
        scope: ScopeKind,
    },
    EndpointNotFound {
        endpoint: &'a str,
    },
    IdsResolved {
        endpoint: &'a str,
        ids: u64,
    },
    EmptyShortCircuit {
        endpoint: &'a str,
    },
    RelationRows {
        relation: Relation,
        rows: u64,
        orphans: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::ExecStart { kind, endpoint } => {
                metrics::with_state_mut(|m| {
                    let entry = m.endpoints.entry(endpoint.to_string()).or_default();
                    match kind {
                        ExecKind::Policies => {
                            m.ops.policy_calls = m.ops.policy_calls.saturating_add(1);
                            entry.policy_calls = entry.policy_calls.saturating_add(1);
                        }
                        ExecKind::Checks => {
                            m.ops.check_calls = m.ops.check_calls.saturating_add(1);
                            entry.check_calls = entry.check_calls.saturating_add(1);
                        }
                    }
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                endpoint,
                rows_returned,
                elapsed_us,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_returned = m.ops.rows_returned.saturating_add(rows_returned);
                    match kind {
                        ExecKind::Policies => metrics::add_latency(
                            &mut m.perf.policy_us_total,
                            &mut m.perf.policy_us_max,
                            elapsed_us,
                        ),
                        ExecKind::Checks => metrics::add_latency(
                            &mut m.perf.check_us_total,
                            &mut m.perf.check_us_max,
                            elapsed_us,
                        ),
                    }

                    let entry = m.endpoints.entry(endpoint.to_string()).or_default();
                    entry.rows_returned = entry.rows_returned.saturating_add(rows_returned);
                });
            }

            MetricsEvent::PartitionQuery { scope } => {
                metrics::with_state_mut(|m| {
                    let counter = match scope {
                        ScopeKind::Policies => &mut m.ops.policy_queries,
                        ScopeKind::CheckIds => &mut m.ops.check_id_queries,
                        ScopeKind::Checks => &mut m.ops.check_queries,
                    };
                    *counter = counter.saturating_add(1);
                });
            }

            MetricsEvent::EndpointNotFound { endpoint } => {
                metrics::with_state_mut(|m| {
                    m.ops.endpoints_not_found = m.ops.endpoints_not_found.saturating_add(1);
                    let entry = m.endpoints.entry(endpoint.to_string()).or_default();
                    entry.not_found = entry.not_found.saturating_add(1);
                });
            }

            MetricsEvent::IdsResolved { ids, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.ids_resolved = m.ops.ids_resolved.saturating_add(ids);
                });
            }

            MetricsEvent::EmptyShortCircuit { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.empty_short_circuits = m.ops.empty_short_circuits.saturating_add(1);
                });
            }

            MetricsEvent::RelationRows {
                relation,
                rows,
                orphans,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.relational_lookups = m.ops.relational_lookups.saturating_add(1);
                    match relation {
                        Relation::Compliance => {
                            m.ops.compliance_rows = m.ops.compliance_rows.saturating_add(rows);
                        }
                        Relation::Rules => m.ops.rules_rows = m.ops.rules_rows.saturating_add(rows),
                    }
                    m.ops.orphan_rows = m.ops.orphan_rows.saturating_add(orphans);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::since_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state (counters + perf).
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

/// Span
/// RAII guard that emits start/finish metrics events for one executor call.
/// Ensures finish accounting happens even on unwind.

pub(crate) struct Span {
    kind: ExecKind,
    endpoint: String,
    start: Instant,
    rows: u64,
}

impl Span {
    #[must_use]
    /// Start a metrics span for one endpoint and executor kind.
    pub(crate) fn new(kind: ExecKind, endpoint: &str) -> Self {
        record(MetricsEvent::ExecStart { kind, endpoint });

        Self {
            kind,
            endpoint: endpoint.to_string(),
            start: Instant::now(),
            rows: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        let elapsed_us = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);

        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            endpoint: &self.endpoint,
            rows_returned: self.rows,
            elapsed_us,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::Cell,
        panic::{AssertUnwindSafe, catch_unwind},
    };

    #[derive(Default)]
    struct CountingSink {
        calls: Cell<usize>,
    }

    impl MetricsSink for CountingSink {
        fn record(&self, _: MetricsEvent<'_>) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    fn short_circuit() -> MetricsEvent<'static> {
        MetricsEvent::EmptyShortCircuit { endpoint: "001" }
    }

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let outer = Rc::new(CountingSink::default());
        let inner = Rc::new(CountingSink::default());

        // No override installed yet.
        record(short_circuit());
        assert_eq!(outer.calls.get(), 0);

        with_metrics_sink(outer.clone(), || {
            record(short_circuit());
            assert_eq!(outer.calls.get(), 1);

            with_metrics_sink(inner.clone(), || record(short_circuit()));

            // Inner override was restored to outer override.
            record(short_circuit());
        });

        assert_eq!(outer.calls.get(), 2);
        assert_eq!(inner.calls.get(), 1);

        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let sink = Rc::new(CountingSink::default());
        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(sink.clone(), || {
                record(short_circuit());
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();

        assert!(panicked);
        assert_eq!(sink.calls.get(), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn span_records_start_and_finish_into_global_state() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });
        metrics_reset_all();

        {
            let mut span = Span::new(ExecKind::Checks, "001");
            span.set_rows(4);
        }

        let report = metrics_report(None);
        let counters = report.counters.unwrap();
        assert_eq!(counters.ops.check_calls, 1);
        assert_eq!(counters.ops.rows_returned, 4);
        assert_eq!(counters.endpoints["001"].check_calls, 1);
        assert_eq!(report.endpoint_counters[0].endpoint, "001");
    }

    #[test]
    fn partition_reads_are_counted_by_scope_and_relation() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });
        metrics_reset_all();

        record(MetricsEvent::RelationRows {
            relation: Relation::Compliance,
            rows: 3,
            orphans: 1,
        });
        record(MetricsEvent::RelationRows {
            relation: Relation::Rules,
            rows: 2,
            orphans: 0,
        });

        record(MetricsEvent::PartitionQuery {
            scope: ScopeKind::CheckIds,
        });

        metrics::with_state(|m| {
            assert_eq!(m.ops.check_id_queries, 1);
            assert_eq!(m.ops.relational_lookups, 2);
            assert_eq!(m.ops.compliance_rows, 3);
            assert_eq!(m.ops.rules_rows, 2);
            assert_eq!(m.ops.orphan_rows, 1);
        });
    }
}
