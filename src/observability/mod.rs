//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probes and aggregator produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (per-probe counters and latency)
//!
//! Consumers:
//!     → stdout log stream
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never formatted-in values
//! - Metrics are recorded even when no exporter is installed (no-op recorder)

pub mod logging;
pub mod metrics;
