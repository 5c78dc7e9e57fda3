//! Uniform probe result model.
//!
//! # States
//! ```text
//! check() → Success
//! check() → Failure(Unreachable | ProtocolMismatch | ApplicationError | MissingArtifact)
//! ```
//!
//! # Design Decisions
//! - One `ServiceStatus` per probe per run, never reused
//! - Failure kind only shapes `details`/`severity`; there is no retry edge
//! - `MissingArtifact` is a warning: a build step fixes it, no service is down

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Display severity of a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Ok => "✅",
            Severity::Warning => "⚠️",
            Severity::Error => "❌",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Severity::Ok => "green",
            Severity::Warning => "yellow",
            Severity::Error => "red",
        }
    }
}

/// Why a probe reported `connected: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No transport-level connection.
    Unreachable,
    /// Connected, but the handshake reply was not the expected one.
    ProtocolMismatch,
    /// The client library or service reported an error.
    ApplicationError,
    /// An expected build artifact is absent.
    MissingArtifact,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Unreachable => "unreachable",
            FailureKind::ProtocolMismatch => "protocol_mismatch",
            FailureKind::ApplicationError => "application_error",
            FailureKind::MissingArtifact => "missing_artifact",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FailureKind::MissingArtifact => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Outcome of one finished check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Success,
    Failure(FailureKind),
}

impl ProbeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeState::Success => "success",
            ProbeState::Failure(kind) => kind.as_str(),
        }
    }
}

/// Normalized outcome of checking one backing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub connected: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Captured error text. Only set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(default)]
    pub elapsed_ms: u64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

impl ServiceStatus {
    /// A successful check.
    pub fn connected(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::build(name.into(), true, message.into(), Severity::Ok, None)
    }

    /// A failed check of the given kind. Severity follows the kind.
    pub fn failed(name: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self::build(name.into(), false, message.into(), kind.severity(), Some(kind))
    }

    fn build(
        name: String,
        connected: bool,
        message: String,
        severity: Severity,
        failure: Option<FailureKind>,
    ) -> Self {
        Self {
            name,
            connected,
            message,
            details: None,
            version: None,
            error: None,
            severity,
            failure,
            elapsed_ms: 0,
            icon: severity.icon().to_string(),
            color: severity.color().to_string(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attach captured error text. Ignored on a connected status.
    pub fn with_error(mut self, error: impl ToString) -> Self {
        if !self.connected {
            self.error = Some(error.to_string());
        }
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = elapsed.as_millis() as u64;
        self
    }

    pub fn state(&self) -> ProbeState {
        match (self.connected, self.failure) {
            (true, _) => ProbeState::Success,
            (false, Some(kind)) => ProbeState::Failure(kind),
            (false, None) => ProbeState::Failure(FailureKind::ApplicationError),
        }
    }
}
