//! HTTP surface for the dashboard.
//!
//! # Data Flow
//! ```text
//! GET / or /api/status
//!     → request.rs (x-request-id)
//!     → handlers.rs (load current ProbeSet, run one pass)
//!     → JSON DashboardReport
//! ```
//!
//! # Design Decisions
//! - Always 200 for the report: failed services are rows, not HTTP errors
//! - The probe set is swapped atomically on config reload

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{request_id_header, MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
