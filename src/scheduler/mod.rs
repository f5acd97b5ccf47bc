//! The alert scheduler: owns the table of per-alert recurring jobs and the
//! arm/disarm/bootstrap lifecycle.
//!
//! Each armed alert owns one job chain: a one-shot warm-up delay followed by
//! a recurring loop that runs the [`AlertRunner`] once per period. The chain
//! is cancellable as a unit, so disarming during the warm-up phase also
//! prevents the recurring phase from ever starting. Scheduling is
//! single-process; running multiple instances of the service would arm every
//! alert once per instance and duplicate emails.

pub mod runner;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::DashMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    models::AlertFrequency,
    persistence::{error::PersistenceError, traits::AlertRepository},
    scheduler::runner::{AlertRunner, TickOutcome},
};

/// Errors that can occur during scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Alerts could not be loaded from the store during bootstrap.
    #[error("Failed to load alerts for bootstrap: {0}")]
    AlertLoad(#[from] PersistenceError),
}

/// The live job chain for one alert. Owned exclusively by the scheduler and
/// never exposed.
struct JobHandle {
    /// Monotonic arm counter, used so a job removing its own entry can never
    /// evict a newer handle armed for the same alert id.
    generation: u64,

    /// Cancels the whole warm-up + recurring chain.
    cancellation_token: CancellationToken,

    /// The spawned job task. Kept for ownership; disarm does not await it,
    /// an in-flight tick is allowed to finish.
    _task: tokio::task::JoinHandle<()>,
}

struct SchedulerInner {
    jobs: DashMap<i64, JobHandle>,
    generation: AtomicU64,
    repo: Arc<dyn AlertRepository>,
    runner: Arc<AlertRunner>,
}

/// Orchestrates the per-alert job table.
///
/// `arm`, `disarm` and `bootstrap` may be called concurrently from HTTP
/// handlers; the concurrent map and the disarm-before-arm pattern serialize
/// re-registration so at most one job chain is live per alert id.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl Scheduler {
    /// Creates a scheduler over the given store and runner.
    pub fn new(repo: Arc<dyn AlertRepository>, runner: Arc<AlertRunner>) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                jobs: DashMap::new(),
                generation: AtomicU64::new(0),
                repo,
                runner,
            }),
        }
    }

    /// Arms the recurring job for an alert. Any existing job for the same id
    /// is disarmed first, so calling `arm` twice never leaves two live
    /// timers.
    pub fn arm(&self, alert_id: i64, frequency_label: &str) {
        self.disarm(alert_id);

        let schedule = AlertFrequency::resolve(frequency_label);
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let cancellation_token = CancellationToken::new();

        let inner = Arc::clone(&self.inner);
        let token = cancellation_token.clone();
        let task = tokio::spawn(async move {
            // Warm-up: the first run only fires once a full period has
            // elapsed, avoiding an immediate duplicate check right after
            // creation.
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(alert_id, "Job cancelled during warm-up.");
                    return;
                }
                _ = tokio::time::sleep(schedule.initial_delay) => {}
            }

            loop {
                let outcome = inner.runner.run_tick(alert_id).await;
                if outcome == TickOutcome::Disarm {
                    // Only evict our own entry: the alert may have been
                    // re-armed with a newer handle while this tick ran.
                    inner
                        .jobs
                        .remove_if(&alert_id, |_, handle| handle.generation == generation);
                    tracing::debug!(alert_id, "Job removed itself from the table.");
                    break;
                }

                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(schedule.repeat_interval) => {}
                }
            }
        });

        self.inner.jobs.insert(
            alert_id,
            JobHandle { generation, cancellation_token, _task: task },
        );
        tracing::info!(alert_id, frequency = frequency_label, "Alert armed.");
    }

    /// Disarms an alert's job. A no-op when the alert has no active job;
    /// safe to call repeatedly. An in-flight tick is not interrupted, but no
    /// further tick will be scheduled.
    pub fn disarm(&self, alert_id: i64) {
        if let Some((_, handle)) = self.inner.jobs.remove(&alert_id) {
            handle.cancellation_token.cancel();
            tracing::info!(alert_id, "Alert disarmed.");
        }
    }

    /// Re-arms every persisted non-deleted alert after a process start,
    /// oldest first. Returns the number of armed jobs.
    pub async fn bootstrap(&self) -> Result<usize, SchedulerError> {
        let alerts = self.inner.repo.list_active_alerts().await?;
        let count = alerts.len();
        for alert in alerts {
            self.arm(alert.id, &alert.frequency);
        }
        tracing::info!(count, "Bootstrap complete, all persisted alerts armed.");
        Ok(count)
    }

    /// The number of currently armed jobs.
    pub fn active_jobs(&self) -> usize {
        self.inner.jobs.len()
    }

    /// Disarms every job. Used during graceful shutdown.
    pub fn shutdown(&self) {
        let alert_ids: Vec<i64> = self.inner.jobs.iter().map(|entry| *entry.key()).collect();
        for alert_id in alert_ids {
            self.disarm(alert_id);
        }
        tracing::info!("Scheduler shut down, all jobs disarmed.");
    }
}
