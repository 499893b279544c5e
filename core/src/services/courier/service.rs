//! Courier service implementation

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use oc_shared::utils::mask::mask_receiver;

use crate::domain::entities::{ChannelType, OtpQueueItem, RetryTask};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::OtpQueue;
use crate::services::channel::{render_otp_message, ChannelProvider, ProviderRegistry};
use crate::services::rate_limit::{FixedWindowRateLimiter, RateLimitKey};

use super::config::CourierConfig;
use super::types::{DispatchOutcome, OtpRequest, RedeliveryOutcome};

/// Entry point for OTP delivery and the redelivery path of the retry worker
pub struct CourierService {
    queue: Arc<dyn OtpQueue>,
    rate_limiter: Arc<FixedWindowRateLimiter>,
    providers: Arc<dyn ProviderRegistry>,
    config: CourierConfig,
}

impl CourierService {
    pub fn new(
        queue: Arc<dyn OtpQueue>,
        rate_limiter: Arc<FixedWindowRateLimiter>,
        providers: Arc<dyn ProviderRegistry>,
        config: CourierConfig,
    ) -> Self {
        Self {
            queue,
            rate_limiter,
            providers,
            config,
        }
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// Admit, record and attempt delivery of one OTP
    ///
    /// # Returns
    /// * `Ok(DispatchOutcome::Delivered)` - First attempt succeeded
    /// * `Ok(DispatchOutcome::Queued)` - First attempt failed, retry task scheduled
    /// * `Err(DomainError::RateLimitExceeded)` - Denied before anything was queued
    /// * `Err(DomainError::Configuration)` - No provider, or the provider is misconfigured
    pub async fn send_otp(&self, request: OtpRequest) -> DomainResult<DispatchOutcome> {
        validate(&request)?;
        let OtpRequest {
            tenant_id,
            receiver,
            channel,
            otp,
        } = request;
        let masked = mask_receiver(&receiver);

        if let Some(limit) = self.config.rate_limit {
            let key = RateLimitKey::otp_send(&tenant_id, &receiver);
            self.rate_limiter.check(&key, limit.limit, limit.window).await?;
        }

        let provider = self.resolve(&tenant_id, &receiver, channel)?;

        let message = render_otp_message(&otp, self.config.otp_ttl);
        let item = OtpQueueItem::new(tenant_id.as_str(), receiver.as_str(), message);
        self.queue.enqueue(&item, self.config.otp_ttl).await?;

        match provider
            .send_otp(&tenant_id, &receiver, &otp, self.config.otp_ttl)
            .await
        {
            Ok(message_id) => {
                // A retry left over from an earlier OTP must not resend the old code
                if let Err(e) = self.queue.delete_retry(&tenant_id, &receiver).await {
                    warn!(
                        tenant_id = %tenant_id,
                        receiver = %masked,
                        error = %e,
                        event = "stale_retry_cleanup_failed"
                    );
                }
                info!(
                    tenant_id = %tenant_id,
                    receiver = %masked,
                    channel = %channel,
                    message_id = %message_id,
                    event = "otp_delivered"
                );
                Ok(DispatchOutcome::Delivered { message_id })
            }
            Err(e) if e.is_retryable() => {
                let task = RetryTask::new(tenant_id.as_str(), receiver.as_str(), channel, otp);
                let stored = self
                    .queue
                    .enqueue_retry(&task, self.config.retry_policy.delay_for(0))
                    .await?;
                warn!(
                    tenant_id = %tenant_id,
                    receiver = %masked,
                    channel = %channel,
                    retry_count = stored.retry_count,
                    error = %e,
                    event = "otp_delivery_queued"
                );
                Ok(DispatchOutcome::Queued {
                    ready_at: stored.ready_at,
                    retry_count: stored.retry_count,
                })
            }
            Err(e) => {
                error!(
                    tenant_id = %tenant_id,
                    receiver = %masked,
                    channel = %channel,
                    error = %e,
                    event = "otp_delivery_failed"
                );
                if let Err(cleanup) = self.queue.delete(&tenant_id, &receiver).await {
                    warn!(error = %cleanup, "Failed to remove pending OTP after failed send");
                }
                Err(e)
            }
        }
    }

    /// Attempt one due retry task
    ///
    /// Queue errors are returned; vendor failures are turned into an outcome.
    pub async fn redeliver(&self, task: &RetryTask) -> DomainResult<RedeliveryOutcome> {
        let masked = mask_receiver(&task.receiver);

        let Some(provider) = self.providers.resolve(&task.tenant_id, task.channel) else {
            warn!(
                tenant_id = %task.tenant_id,
                receiver = %masked,
                channel = %task.channel,
                event = "retry_provider_missing"
            );
            self.queue.delete_retry_task(task).await?;
            return Ok(RedeliveryOutcome::Dropped);
        };

        let result = provider
            .send_otp(&task.tenant_id, &task.receiver, &task.message, self.config.otp_ttl)
            .await;

        match result {
            Ok(message_id) => {
                self.queue.delete_retry_task(task).await?;
                self.queue.delete(&task.tenant_id, &task.receiver).await?;
                info!(
                    tenant_id = %task.tenant_id,
                    receiver = %masked,
                    channel = %task.channel,
                    retry_count = task.retry_count,
                    event = "otp_redelivered"
                );
                Ok(RedeliveryOutcome::Delivered { message_id })
            }
            Err(e) if !e.is_retryable() => {
                error!(
                    tenant_id = %task.tenant_id,
                    receiver = %masked,
                    channel = %task.channel,
                    retry_count = task.retry_count,
                    error = %e,
                    event = "retry_dropped"
                );
                self.queue.delete_retry_task(task).await?;
                Ok(RedeliveryOutcome::Dropped)
            }
            Err(e) if self.config.retry_policy.is_exhausted(task.retry_count) => {
                error!(
                    tenant_id = %task.tenant_id,
                    receiver = %masked,
                    channel = %task.channel,
                    retry_count = task.retry_count,
                    error = %e,
                    event = "retry_abandoned"
                );
                self.queue.delete_retry_task(task).await?;
                Ok(RedeliveryOutcome::Abandoned {
                    retry_count: task.retry_count,
                })
            }
            Err(e) => {
                let delay = self.config.retry_policy.delay_for(task.retry_count);
                let stored = self.queue.enqueue_retry(task, delay).await?;
                warn!(
                    tenant_id = %task.tenant_id,
                    receiver = %masked,
                    channel = %task.channel,
                    retry_count = stored.retry_count,
                    delay_secs = delay.as_secs(),
                    error = %e,
                    event = "retry_rescheduled"
                );
                Ok(RedeliveryOutcome::Rescheduled {
                    ready_at: stored.ready_at,
                    retry_count: stored.retry_count,
                })
            }
        }
    }

    /// Withdraw the pending OTP and any scheduled retry
    pub async fn cancel(&self, tenant_id: &str, receiver: &str) -> DomainResult<()> {
        self.queue.delete(tenant_id, receiver).await?;
        self.queue.delete_retry(tenant_id, receiver).await?;
        debug!(
            tenant_id = %tenant_id,
            receiver = %mask_receiver(receiver),
            event = "otp_cancelled"
        );
        Ok(())
    }

    /// Pending OTP for a receiver, `NotFound` once confirmed, cancelled or expired
    pub async fn pending(&self, tenant_id: &str, receiver: &str) -> DomainResult<OtpQueueItem> {
        self.queue.get(tenant_id, receiver).await
    }

    fn resolve(
        &self,
        tenant_id: &str,
        receiver: &str,
        channel: ChannelType,
    ) -> DomainResult<Arc<dyn ChannelProvider>> {
        self.providers.resolve(tenant_id, channel).ok_or_else(|| {
            warn!(
                tenant_id = %tenant_id,
                receiver = %mask_receiver(receiver),
                channel = %channel,
                event = "provider_missing"
            );
            DomainError::configuration(format!(
                "No {} provider configured for tenant {}",
                channel, tenant_id
            ))
        })
    }
}

fn validate(request: &OtpRequest) -> DomainResult<()> {
    let missing = [
        ("tenant_id", &request.tenant_id),
        ("receiver", &request.receiver),
        ("otp", &request.otp),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty());

    match missing {
        Some((field, _)) => Err(DomainError::Validation {
            message: format!("{} must not be empty", field),
        }),
        None => Ok(()),
    }
}
