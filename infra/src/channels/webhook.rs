//! Generic webhook provider

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use oc_core::{render_otp_message, ChannelProvider, ChannelType, DomainError, DomainResult};
use oc_shared::config::WebhookConfig;
use oc_shared::utils::mask::mask_receiver;

use super::http::{message_id_from, status_error, transport_error};

#[derive(Serialize)]
struct WebhookPayload<'a> {
    id: String,
    tenant_id: &'a str,
    receiver: &'a str,
    otp: &'a str,
    message: &'a str,
    expires_in_seconds: u64,
}

/// Stateless JSON POST; delivered iff the endpoint answers 2xx
pub struct WebhookProvider {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookProvider {
    pub fn new(client: reqwest::Client, config: WebhookConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ChannelProvider for WebhookProvider {
    async fn send_otp(
        &self,
        tenant_id: &str,
        receiver: &str,
        otp: &str,
        ttl: Duration,
    ) -> DomainResult<String> {
        if self.config.url.is_empty() {
            return Err(DomainError::configuration("Webhook URL is not configured"));
        }

        let message = render_otp_message(otp, ttl);
        let payload = WebhookPayload {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            receiver,
            otp,
            message: &message,
            expires_in_seconds: ttl.as_secs(),
        };

        let mut request = self.client.post(&self.config.url).json(&payload);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(ChannelType::Webhook, e))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(status_error(ChannelType::Webhook, status, &body));
        }

        let message_id = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| message_id_from(&json, &["id", "message_id"]))
            .unwrap_or(payload.id);

        debug!(
            tenant_id = %tenant_id,
            receiver = %mask_receiver(receiver),
            status = status.as_u16(),
            event = "webhook_accepted"
        );
        Ok(message_id)
    }

    async fn refresh_credential(&self, _tenant_id: &str) -> DomainResult<()> {
        Ok(())
    }

    fn channel_type(&self) -> ChannelType {
        ChannelType::Webhook
    }

    async fn health_check(&self) -> bool {
        !self.config.url.is_empty()
    }
}
