//! Dependency health dashboard server.
//!
//! # Architecture Overview
//!
//! ```text
//!     GET /api/status
//!     ───────────────▶ http::server ──▶ dashboard::ProbeSet ──▶ Aggregator
//!                                                                  │
//!                         ┌───────────────┬───────────────┬────────┴──────┐
//!                         ▼               ▼               ▼               ▼
//!                    DatabaseProbe    CacheProbe   HttpServiceProbe  AssetManifestProbe
//!                    (SQL)            (RESP/TCP)   (HTTP + JSON)     (filesystem)
//!                         │               │               │               │
//!                         └───────────────┴──── ServiceStatus ────────────┘
//!                                                  │
//!     JSON DashboardReport  ◀──────────────────────┘
//! ```
//!
//! Configuration path: first CLI argument, else `DASHBOARD_CONFIG`, else
//! `dashboard.toml`. A missing file means built-in defaults.

use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use service_dashboard::config::{load_config, watcher::ConfigWatcher, DashboardConfig};
use service_dashboard::http::HttpServer;
use service_dashboard::lifecycle::{signals::forward_signals, Shutdown};
use service_dashboard::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DASHBOARD_CONFIG").ok())
        .unwrap_or_else(|| "dashboard.toml".to_string())
        .into();

    let (config, from_file) = if config_path.exists() {
        (load_config(&config_path)?, true)
    } else {
        (DashboardConfig::default(), false)
    };

    logging::init(&config.observability.log_level);
    tracing::info!("service-dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    if from_file {
        tracing::info!(path = ?config_path, "Configuration loaded");
    } else {
        tracing::warn!(path = ?config_path, "Config file not found, using defaults");
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Keep the watcher alive for the life of the server.
    let (_watcher, config_updates) = if from_file {
        let (watcher, updates) = ConfigWatcher::new(&config_path);
        match watcher.run() {
            Ok(handle) => (Some(handle), updates),
            Err(e) => {
                tracing::warn!(error = %e, "Config hot reload unavailable");
                (None, updates)
            }
        }
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(forward_signals(shutdown.clone()));

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
