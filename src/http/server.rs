//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dashboard handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Swap in a rebuilt probe set when the config changes
//! - Stop on shutdown signal

use arc_swap::ArcSwap;
use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::DashboardConfig;
use crate::dashboard::{BuildError, ProbeSet};
use crate::http::handlers::{get_status, healthz};
use crate::http::request::{request_id_header, MakeRequestUuid};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub probes: Arc<ArcSwap<ProbeSet>>,
}

/// HTTP server for the dashboard.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: DashboardConfig,
}

impl HttpServer {
    /// Create a new HTTP server, building probes from the given configuration.
    pub fn new(config: DashboardConfig) -> Result<Self, BuildError> {
        let probes = ProbeSet::from_config(&config)?;
        Ok(Self::with_probes(config, probes))
    }

    /// Create a server around an already-built probe set.
    pub fn with_probes(config: DashboardConfig, probes: ProbeSet) -> Self {
        let state = AppState {
            probes: Arc::new(ArcSwap::from_pointee(probes)),
        };
        let router = Self::build_router(&config, state.clone());
        Self { router, state, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DashboardConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(get_status))
            .route("/api/status", get(get_status))
            .route("/healthz", get(healthz))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::new(request_id_header()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
    }

    /// Serve until shutdown, applying config updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<DashboardConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.listener.request_timeout_secs,
            "HTTP server starting"
        );

        let probes = self.state.probes.clone();
        let reloader = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                match ProbeSet::from_config(&new_config) {
                    Ok(set) => {
                        tracing::info!(probes = ?set.names(), "Probe set reloaded");
                        probes.store(Arc::new(set));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to rebuild probes, keeping current set");
                    }
                }
            }
        });

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        result
    }
}
