//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → HTTP server stops accepting → config watcher dropped → exit
//! ```
//!
//! # Design Decisions
//! - In-flight probe tasks are aborted, not drained

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
