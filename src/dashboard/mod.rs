//! Dashboard assembly.
//!
//! # Data Flow
//! ```text
//! DashboardConfig
//!     → ProbeSet::from_config (database, cache, mail, assets, in that order)
//!     → aggregator.rs (concurrent run, ordered join)
//!     → DashboardReport (handed to the HTTP layer or CLI)
//! ```

pub mod aggregator;

use std::sync::Arc;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlPoolOptions;
use thiserror::Error;

use crate::config::DashboardConfig;
use crate::probe::{
    AssetManifestProbe, CacheProbe, DatabaseProbe, HttpServiceProbe, Probe, ServiceStatus, Severity,
};

pub use aggregator::Aggregator;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("database handle: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// The configured probes in display order, plus the runner for them.
pub struct ProbeSet {
    title: String,
    probes: Vec<Arc<dyn Probe>>,
    aggregator: Aggregator,
}

impl ProbeSet {
    pub fn new(title: impl Into<String>, probes: Vec<Arc<dyn Probe>>, deadline: Duration) -> Self {
        Self {
            title: title.into(),
            probes,
            aggregator: Aggregator::new(deadline),
        }
    }

    /// Build probes for every enabled service. Must be called inside a Tokio runtime.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, BuildError> {
        let mut probes: Vec<Arc<dyn Probe>> = Vec::new();

        if config.database.enabled {
            let pool = MySqlPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(config.database.timeout())
                .connect_lazy(&config.database.url)?;
            probes.push(Arc::new(
                DatabaseProbe::new(Arc::new(pool), config.database.timeout())
                    .with_name(config.database.display_name.clone()),
            ));
        }

        if config.cache.enabled {
            probes.push(Arc::new(
                CacheProbe::new(config.cache.host.clone(), config.cache.port, config.cache.timeout())
                    .with_name(config.cache.display_name.clone()),
            ));
        }

        if config.mail.enabled {
            let client = reqwest::Client::builder()
                .connect_timeout(config.mail.timeout())
                .build()?;
            probes.push(Arc::new(
                HttpServiceProbe::new(client, config.mail.base_url.clone(), config.mail.timeout())
                    .with_limit(config.mail.list_limit)
                    .with_name(config.mail.display_name.clone()),
            ));
        }

        if config.assets.enabled {
            probes.push(Arc::new(
                AssetManifestProbe::new(&config.assets.public_dir)
                    .with_name(config.assets.display_name.clone()),
            ));
        }

        tracing::info!(
            probes = ?probes.iter().map(|p| p.name().to_string()).collect::<Vec<_>>(),
            deadline_secs = config.dashboard.deadline_secs,
            "Probe set built"
        );

        Ok(Self::new(config.dashboard.title.clone(), probes, config.dashboard.deadline()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    /// Run one pass over every probe.
    pub async fn run(&self) -> DashboardReport {
        let services = self.aggregator.run_all(&self.probes).await;
        DashboardReport::new(self.title.clone(), services)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub ok: usize,
    pub warning: usize,
    pub error: usize,
}

/// Result of one dashboard pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub title: String,
    pub summary: SeverityCounts,
    pub services: Vec<ServiceStatus>,
}

impl DashboardReport {
    pub fn new(title: String, services: Vec<ServiceStatus>) -> Self {
        let mut summary = SeverityCounts::default();
        for status in &services {
            match status.severity {
                Severity::Ok => summary.ok += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Error => summary.error += 1,
            }
        }
        Self { title, summary, services }
    }

    /// True when no service is in `error`. Warnings do not count.
    pub fn is_operational(&self) -> bool {
        self.summary.error == 0
    }
}
