//! Scripted channel provider for courier and worker tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::entities::ChannelType;
use crate::errors::{DomainError, DomainResult};
use crate::services::channel::ChannelProvider;

/// Result a scripted send produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    Delivered,
    Transient,
    AuthExpired,
    Misconfigured,
}

pub struct MockChannelProvider {
    channel: ChannelType,
    script: Mutex<VecDeque<MockOutcome>>,
    fallback: MockOutcome,
    pub sent: Mutex<Vec<(String, String, String)>>,
    refreshes: AtomicUsize,
    refresh_delay: Duration,
    expires_at: Option<DateTime<Utc>>,
}

impl MockChannelProvider {
    /// Provider that answers every send with `fallback`
    pub fn new(channel: ChannelType, fallback: MockOutcome) -> Self {
        Self {
            channel,
            script: Mutex::new(VecDeque::new()),
            fallback,
            sent: Mutex::new(Vec::new()),
            refreshes: AtomicUsize::new(0),
            refresh_delay: Duration::ZERO,
            expires_at: None,
        }
    }

    /// Provider answering with `script` in order, then with `fallback`
    pub fn scripted(channel: ChannelType, script: &[MockOutcome], fallback: MockOutcome) -> Self {
        let provider = Self::new(channel, fallback);
        provider.script.lock().unwrap().extend(script.iter().copied());
        provider
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelProvider for MockChannelProvider {
    async fn send_otp(
        &self,
        tenant_id: &str,
        receiver: &str,
        otp: &str,
        _ttl: Duration,
    ) -> DomainResult<String> {
        self.sent.lock().unwrap().push((
            tenant_id.to_string(),
            receiver.to_string(),
            otp.to_string(),
        ));
        let outcome = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);
        match outcome {
            MockOutcome::Delivered => Ok(format!("mock-msg-{}", self.send_count())),
            MockOutcome::Transient => Err(DomainError::transient(self.channel, "vendor returned 503")),
            MockOutcome::AuthExpired => Err(DomainError::AuthExpired { channel: self.channel }),
            MockOutcome::Misconfigured => Err(DomainError::configuration("endpoint not configured")),
        }
    }

    async fn refresh_credential(&self, _tenant_id: &str) -> DomainResult<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        Ok(())
    }

    fn channel_type(&self) -> ChannelType {
        self.channel
    }

    async fn health_check(&self) -> bool {
        self.fallback != MockOutcome::Misconfigured
    }

    fn credential_expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}
