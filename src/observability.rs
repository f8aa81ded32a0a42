use std::net::SocketAddr;

use crate::engine::Decision;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: admission evaluations. Labels: outcome.
pub const EVALUATIONS_TOTAL: &str = "maitre_evaluations_total";

/// Histogram: admission evaluation latency in seconds.
pub const EVALUATION_DURATION_SECONDS: &str = "maitre_evaluation_duration_seconds";

/// Counter: booking submissions. Labels: outcome.
pub const SUBMISSIONS_TOTAL: &str = "maitre_submissions_total";

/// Counter: table assignments refused because the table was in use.
pub const TABLE_CONFLICTS_TOTAL: &str = "maitre_table_conflicts_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Map a decision to a short label for metrics.
pub fn decision_label(decision: &Decision) -> &'static str {
    match decision {
        Decision::Accept => "accept",
        Decision::Reject(_) => "reject",
    }
}
