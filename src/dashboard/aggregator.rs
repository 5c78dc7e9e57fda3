//! Concurrent probe runner.
//!
//! # Responsibilities
//! - Spawn one task per probe
//! - Join results back in declared order
//! - Convert panics and deadline overruns into synthetic statuses
//!
//! # Design Decisions
//! - Every input probe yields exactly one output status
//! - Dropping an in-progress run aborts the remaining probe tasks
//! - The pass deadline is a backstop; probes enforce their own ceilings first

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};

use crate::observability::metrics;
use crate::probe::{FailureKind, Probe, ServiceStatus};

/// Spawned probe tasks. Aborts whatever is still running when dropped.
struct ProbeTasks(Vec<JoinHandle<ServiceStatus>>);

impl Drop for ProbeTasks {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    deadline: Duration,
}

impl Aggregator {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    /// Run every probe and return their statuses in input order.
    pub async fn run_all(&self, probes: &[Arc<dyn Probe>]) -> Vec<ServiceStatus> {
        let started = Instant::now();
        let deadline = started + self.deadline;

        let mut tasks = ProbeTasks(
            probes
                .iter()
                .map(|probe| {
                    let probe = probe.clone();
                    tokio::spawn(async move { probe.check().await })
                })
                .collect(),
        );

        let mut statuses = Vec::with_capacity(probes.len());
        for (probe, handle) in probes.iter().zip(tasks.0.iter_mut()) {
            let status = match timeout_at(deadline, &mut *handle).await {
                Ok(Ok(status)) => status,
                Ok(Err(e)) => {
                    let reason = if e.is_panic() {
                        format!("probe panicked: {}", panic_message(e.into_panic()))
                    } else {
                        "probe task was cancelled".to_string()
                    };
                    tracing::error!(probe = %probe.name(), reason = %reason, "Probe did not return a status");
                    ServiceStatus::failed(probe.name(), FailureKind::ApplicationError, "Check failed to run")
                        .with_error(reason)
                        .with_elapsed(started.elapsed())
                }
                Err(_) => {
                    handle.abort();
                    tracing::warn!(probe = %probe.name(), deadline = ?self.deadline, "Probe abandoned at deadline");
                    ServiceStatus::failed(probe.name(), FailureKind::Unreachable, "Check timed out")
                        .with_error(format!("no result within {:?}", self.deadline))
                        .with_elapsed(started.elapsed())
                }
            };

            metrics::record_probe(&status);
            tracing::debug!(
                probe = %status.name,
                severity = status.severity.as_str(),
                elapsed_ms = status.elapsed_ms,
                "Probe finished"
            );
            statuses.push(status);
        }

        statuses
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
