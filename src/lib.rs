//! Dependency health dashboard library.

pub mod config;
pub mod dashboard;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;

pub use config::schema::DashboardConfig;
pub use dashboard::{DashboardReport, ProbeSet};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use probe::{Probe, ServiceStatus, Severity};
