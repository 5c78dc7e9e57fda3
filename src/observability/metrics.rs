//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dashboard_probe_runs_total` (counter): probe runs by service, severity, outcome
//! - `dashboard_probe_duration_seconds` (histogram): probe latency by service
//!
//! # Design Decisions
//! - Exporter is optional; without it the `metrics` macros are no-ops

use std::net::SocketAddr;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::probe::ServiceStatus;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(status: &ServiceStatus) {
    metrics::counter!(
        "dashboard_probe_runs_total",
        "service" => status.name.clone(),
        "severity" => status.severity.as_str(),
        "outcome" => status.state().as_str()
    )
    .increment(1);
    metrics::histogram!(
        "dashboard_probe_duration_seconds",
        "service" => status.name.clone()
    )
    .record(status.elapsed_ms as f64 / 1000.0);
}
