//! Periodic scan of due retry tasks

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use oc_shared::utils::mask::mask_receiver;

use crate::errors::DomainResult;
use crate::repositories::OtpQueue;
use crate::services::courier::{CourierService, RedeliveryOutcome};

use super::tick_period;
use super::types::RetryRunSummary;

/// Scans the queue for due retry tasks and redelivers them one by one
pub struct RetryWorker {
    queue: Arc<dyn OtpQueue>,
    courier: Arc<CourierService>,
}

impl RetryWorker {
    pub fn new(queue: Arc<dyn OtpQueue>, courier: Arc<CourierService>) -> Self {
        Self { queue, courier }
    }

    /// Run a single scan
    ///
    /// Only a failing scan is returned as an error. A task whose redelivery
    /// fails in the queue is counted and left for the next tick.
    pub async fn run_once(&self) -> DomainResult<RetryRunSummary> {
        let tasks = self.queue.get_due_retry_tasks(Utc::now()).await?;
        let mut summary = RetryRunSummary {
            scanned: tasks.len(),
            ..Default::default()
        };

        for task in &tasks {
            match self.courier.redeliver(task).await {
                Ok(RedeliveryOutcome::Delivered { .. }) => summary.delivered += 1,
                Ok(RedeliveryOutcome::Rescheduled { .. }) => summary.rescheduled += 1,
                Ok(RedeliveryOutcome::Abandoned { .. }) => summary.abandoned += 1,
                Ok(RedeliveryOutcome::Dropped) => summary.dropped += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        tenant_id = %task.tenant_id,
                        receiver = %mask_receiver(&task.receiver),
                        channel = %task.channel,
                        retry_count = task.retry_count,
                        error = %e,
                        event = "retry_task_failed"
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Spawn the scan loop on its own task
    ///
    /// Ticks missed while a scan is still running are skipped. The loop exits
    /// as soon as `cancel` fires, abandoning a scan in progress.
    pub fn start(self: Arc<Self>, cancel: CancellationToken, interval: Duration) -> JoinHandle<()> {
        let interval = tick_period(interval);
        tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                event = "retry_worker_started"
            );

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    result = self.run_once() => {
                        match result {
                            Ok(summary) if summary.is_idle() => {}
                            Ok(summary) => debug!(
                                scanned = summary.scanned,
                                delivered = summary.delivered,
                                rescheduled = summary.rescheduled,
                                abandoned = summary.abandoned,
                                dropped = summary.dropped,
                                failed = summary.failed,
                                event = "retry_scan_completed"
                            ),
                            Err(e) => error!(error = %e, event = "retry_scan_failed"),
                        }
                    }
                }
            }

            info!(event = "retry_worker_stopped");
        })
    }
}
