//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Executors emit `MetricsEvent`s through the sink boundary; structured
//! log lines go through `tracing` at the call sites.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EndpointCounters, EndpointSummary, EventOps, EventPerf, EventReport, EventState};
pub use sink::{
    ExecKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink,
};
