//! Protocol-specific dependency probes.
//!
//! # Data Flow
//! ```text
//! Aggregator
//!     → database.rs (SELECT 1, SELECT version())
//!     → cache.rs    (raw TCP, RESP PING / +PONG)
//!     → mail.rs     (HTTP GET, JSON array body)
//!     → assets.rs   (manifest.json + entrypoints.json on disk)
//!     → status.rs   (every outcome normalized into ServiceStatus)
//! ```
//!
//! # Design Decisions
//! - `check` is total: failures are values, never errors or panics
//! - Each probe owns its own deadline
//! - Shared handles (pool, HTTP client) are passed in, never global

pub mod assets;
pub mod cache;
pub mod database;
pub mod mail;
pub mod status;

use async_trait::async_trait;

pub use assets::AssetManifestProbe;
pub use cache::CacheProbe;
pub use database::{DatabaseProbe, QueryExecutor};
pub use mail::HttpServiceProbe;
pub use status::{FailureKind, ProbeState, ServiceStatus, Severity};

/// A single dependency check.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Display label used for the status row.
    fn name(&self) -> &str;

    /// Run the check once. Must not panic and must respect its own timeout.
    async fn check(&self) -> ServiceStatus;
}
