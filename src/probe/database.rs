//! Relational database probe.
//!
//! # Responsibilities
//! - Run a liveness query against a borrowed handle
//! - Read the server version for display
//!
//! # Design Decisions
//! - The handle is owned by the caller; the probe never opens or closes it
//! - A failing version query does not fail the probe
//! - Both queries run under the probe's ceiling

use std::sync::Arc;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use thiserror::Error;
use tokio::time::timeout;

use crate::probe::{FailureKind, Probe, ServiceStatus};

pub const DEFAULT_NAME: &str = "MySQL DB";
pub const LIVENESS_QUERY: &str = "SELECT 1";
pub const VERSION_QUERY: &str = "SELECT version()";
pub const UNKNOWN_VERSION: &str = "Unknown";
const VERSION_DISPLAY_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    Query(#[from] sqlx::Error),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}

impl DatabaseError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DatabaseError::Timeout(_)
            | DatabaseError::Query(sqlx::Error::Io(_))
            | DatabaseError::Query(sqlx::Error::PoolTimedOut)
            | DatabaseError::Query(sqlx::Error::PoolClosed) => FailureKind::Unreachable,
            DatabaseError::Query(_) => FailureKind::ApplicationError,
        }
    }
}

/// Execute-query capability of a database handle.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Platform label, e.g. `mysql`.
    fn platform(&self) -> &str {
        "database"
    }

    /// Run a statement and discard any rows.
    async fn execute(&self, sql: &str) -> Result<(), DatabaseError>;

    /// Run a query and return the first column of the first row as text.
    async fn fetch_text(&self, sql: &str) -> Result<Option<String>, DatabaseError>;
}

#[async_trait]
impl QueryExecutor for sqlx::MySqlPool {
    fn platform(&self) -> &str {
        "mysql"
    }

    async fn execute(&self, sql: &str) -> Result<(), DatabaseError> {
        sqlx::query(sql).fetch_optional(self).await?;
        Ok(())
    }

    async fn fetch_text(&self, sql: &str) -> Result<Option<String>, DatabaseError> {
        let value: Option<Option<String>> = sqlx::query_scalar(sql).fetch_optional(self).await?;
        Ok(value.flatten())
    }
}

pub struct DatabaseProbe {
    name: String,
    db: Arc<dyn QueryExecutor>,
    timeout: Duration,
}

impl DatabaseProbe {
    pub fn new(db: Arc<dyn QueryExecutor>, timeout: Duration) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            db,
            timeout,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    async fn liveness(&self) -> Result<(), DatabaseError> {
        match timeout(self.timeout, self.db.execute(LIVENESS_QUERY)).await {
            Ok(result) => result,
            Err(_) => Err(DatabaseError::Timeout(self.timeout)),
        }
    }

    /// Server version for display, or `Unknown` when it cannot be read.
    async fn version(&self) -> String {
        let fetched = match timeout(self.timeout, self.db.fetch_text(VERSION_QUERY)).await {
            Ok(result) => result,
            Err(_) => Err(DatabaseError::Timeout(self.timeout)),
        };
        match fetched {
            Ok(Some(version)) if !version.trim().is_empty() => display_version(&version),
            Ok(_) => UNKNOWN_VERSION.to_string(),
            Err(e) => {
                tracing::debug!(error = %e, "Version query failed");
                UNKNOWN_VERSION.to_string()
            }
        }
    }
}

fn display_version(raw: &str) -> String {
    if raw.chars().count() > VERSION_DISPLAY_CHARS {
        let truncated: String = raw.chars().take(VERSION_DISPLAY_CHARS).collect();
        format!("{}...", truncated)
    } else {
        raw.to_string()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl Probe for DatabaseProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> ServiceStatus {
        let start = Instant::now();
        let status = match self.liveness().await {
            Ok(()) => ServiceStatus::connected(&self.name, "Database container connected")
                .with_details(format!("{} service ready", capitalize(self.db.platform())))
                .with_version(self.version().await),
            Err(e) => {
                tracing::warn!(error = %e, "Database probe failed");
                ServiceStatus::failed(&self.name, e.kind(), "Database container unavailable")
                    .with_version(UNKNOWN_VERSION)
                    .with_error(&e)
            }
        };
        status.with_elapsed(start.elapsed())
    }
}
