//! Proactive refresh of expiring channel credentials

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::services::channel::{ChannelProvider, ProviderRegistry};

use super::tick_period;
use super::types::RefreshRunSummary;

/// Refreshes credentials of stateful providers ahead of their expiry
///
/// At most one run is active at a time. A tick arriving while a run is still
/// in progress is skipped, not queued.
pub struct TokenRefreshWorker {
    providers: Arc<dyn ProviderRegistry>,
    refresh_ahead: chrono::Duration,
    running: Arc<AtomicBool>,
}

/// Clears the running flag when a run ends, including by panic or abort
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TokenRefreshWorker {
    pub fn new(providers: Arc<dyn ProviderRegistry>, refresh_ahead: Duration) -> Self {
        Self {
            providers,
            refresh_ahead: chrono::Duration::from_std(refresh_ahead)
                .unwrap_or_else(|_| chrono::Duration::days(365)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Handle one tick: spawn a run unless one is already active
    ///
    /// # Returns
    /// * `Some(handle)` - A run was spawned
    /// * `None` - The previous run is still active, tick skipped
    pub fn handle_tick(self: &Arc<Self>) -> Option<JoinHandle<RefreshRunSummary>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(event = "token_refresh_tick_skipped", "Previous refresh run still active");
            return None;
        }

        let guard = RunningGuard(self.running.clone());
        let worker = Arc::clone(self);
        Some(tokio::spawn(async move {
            let _guard = guard;
            worker.run_once().await
        }))
    }

    /// Refresh every stateful credential due within the refresh-ahead window
    ///
    /// Credentials with unknown expiry are always refreshed.
    pub async fn run_once(&self) -> RefreshRunSummary {
        let deadline = Utc::now() + self.refresh_ahead;
        let mut summary = RefreshRunSummary::default();

        for (tenant_id, provider) in self.providers.stateful_providers() {
            let channel = provider.channel_type();
            let due = provider
                .credential_expires_at()
                .map_or(true, |expires_at| expires_at <= deadline);
            if !due {
                summary.skipped += 1;
                continue;
            }

            match provider.refresh_credential(&tenant_id).await {
                Ok(()) => {
                    summary.refreshed += 1;
                    info!(
                        tenant_id = %tenant_id,
                        channel = %channel,
                        event = "credential_refreshed"
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        tenant_id = %tenant_id,
                        channel = %channel,
                        error = %e,
                        event = "credential_refresh_failed"
                    );
                }
            }
        }

        debug!(
            refreshed = summary.refreshed,
            skipped = summary.skipped,
            failed = summary.failed,
            event = "token_refresh_completed"
        );
        summary
    }

    /// Spawn the tick loop on its own task
    ///
    /// Each tick is fire-and-forget; cancellation stops the loop without
    /// waiting for a run in progress.
    pub fn start(self: Arc<Self>, cancel: CancellationToken, interval: Duration) -> JoinHandle<()> {
        let interval = tick_period(interval);
        tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                refresh_ahead_secs = self.refresh_ahead.num_seconds(),
                event = "token_refresh_worker_started"
            );

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let _ = self.handle_tick();
                    }
                }
            }

            info!(event = "token_refresh_worker_stopped");
        })
    }
}
