use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

///
/// EventState
/// Ephemeral, in-memory counters and simple latency totals for operations.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub perf: EventPerf,
    pub endpoints: BTreeMap<String, EndpointCounters>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            perf: EventPerf::default(),
            endpoints: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Executor entrypoints
    pub policy_calls: u64,
    pub check_calls: u64,

    // Partition reads
    pub policy_queries: u64,
    pub check_id_queries: u64,
    pub check_queries: u64,
    pub relational_lookups: u64,

    // Outcomes
    pub endpoints_not_found: u64,
    pub empty_short_circuits: u64,

    // Rows
    pub rows_returned: u64,
    pub ids_resolved: u64,
    pub compliance_rows: u64,
    pub rules_rows: u64,
    pub orphan_rows: u64,
}

///
/// EndpointCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EndpointCounters {
    pub policy_calls: u64,
    pub check_calls: u64,
    pub rows_returned: u64,
    pub not_found: u64,
}

///
/// EventPerf
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventPerf {
    // Wall-clock totals per executor, in microseconds
    pub policy_us_total: u128,
    pub check_us_total: u128,

    // Maximum observed latencies
    pub policy_us_max: u64,
    pub check_us_max: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters and perf totals.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Accumulate a latency sample and track a max.
pub(crate) fn add_latency(total: &mut u128, max: &mut u64, delta_us: u64) {
    *total = total.saturating_add(u128::from(delta_us));
    if delta_us > *max {
        *max = delta_us;
    }
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `since_ms`.
    pub counters: Option<EventState>,
    /// Per-endpoint counters, busiest first.
    pub endpoint_counters: Vec<EndpointSummary>,
}

///
/// EndpointSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EndpointSummary {
    pub endpoint: String,
    pub policy_calls: u64,
    pub check_calls: u64,
    pub rows_returned: u64,
    pub not_found: u64,
    pub avg_rows_per_call: f64,
}

/// Build a report from in-memory counters.
///
/// With `window_start_ms`, counters are only included when the current
/// window started at or after that instant.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|start| snap.since_ms < start) {
        return EventReport::default();
    }

    let mut endpoint_counters: Vec<EndpointSummary> = snap
        .endpoints
        .iter()
        .map(|(endpoint, c)| {
            let calls = c.policy_calls.saturating_add(c.check_calls);
            let avg = if calls > 0 {
                c.rows_returned as f64 / calls as f64
            } else {
                0.0
            };

            EndpointSummary {
                endpoint: endpoint.clone(),
                policy_calls: c.policy_calls,
                check_calls: c.check_calls,
                rows_returned: c.rows_returned,
                not_found: c.not_found,
                avg_rows_per_call: avg,
            }
        })
        .collect();

    endpoint_counters.sort_by(|a, b| {
        match b
            .avg_rows_per_call
            .partial_cmp(&a.avg_rows_per_call)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => a.endpoint.cmp(&b.endpoint),
            other => other,
        }
    });

    EventReport {
        counters: Some(snap),
        endpoint_counters,
    }
}

///
/// TESTS
///
