use axum::{extract::State, Json};

use crate::dashboard::DashboardReport;
use crate::http::server::AppState;

/// Run one probe pass with the currently loaded configuration.
pub async fn get_status(State(state): State<AppState>) -> Json<DashboardReport> {
    let probes = state.probes.load_full();
    let report = probes.run().await;
    tracing::info!(
        ok = report.summary.ok,
        warning = report.summary.warning,
        error = report.summary.error,
        "Dashboard pass complete"
    );
    Json(report)
}

/// Liveness of the dashboard process itself.
pub async fn healthz() -> &'static str {
    "ok"
}
