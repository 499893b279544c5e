//! Messaging app provider using a long-lived bearer token

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use oc_core::{render_otp_message, ChannelProvider, ChannelType, DomainError, DomainResult};
use oc_shared::config::MessagingAppConfig;
use oc_shared::utils::mask::mask_receiver;

use super::http::{status_error, transport_error};

pub struct MessagingAppProvider {
    client: reqwest::Client,
    config: MessagingAppConfig,
}

impl MessagingAppProvider {
    pub fn new(client: reqwest::Client, config: MessagingAppConfig) -> Self {
        Self { client, config }
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.config.api_base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChannelProvider for MessagingAppProvider {
    async fn send_otp(
        &self,
        tenant_id: &str,
        receiver: &str,
        otp: &str,
        ttl: Duration,
    ) -> DomainResult<String> {
        if self.config.api_base_url.is_empty() || self.config.access_token.is_empty() {
            return Err(DomainError::configuration(
                "Messaging app base URL or access token is not configured",
            ));
        }

        let body = json!({
            "from": self.config.sender_id,
            "to": receiver,
            "type": "text",
            "text": { "body": render_otp_message(otp, ttl) },
        });

        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(ChannelType::MessagingApp, e))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(status_error(ChannelType::MessagingApp, status, &text));
        }

        let message_id = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|json| {
                json.pointer("/messages/0/id")
                    .and_then(|id| id.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("msg-{}", Uuid::new_v4()));

        debug!(
            tenant_id = %tenant_id,
            receiver = %mask_receiver(receiver),
            message_id = %message_id,
            event = "messaging_app_accepted"
        );
        Ok(message_id)
    }

    /// Long-lived tokens are rotated out of band
    async fn refresh_credential(&self, _tenant_id: &str) -> DomainResult<()> {
        Ok(())
    }

    fn channel_type(&self) -> ChannelType {
        ChannelType::MessagingApp
    }

    async fn health_check(&self) -> bool {
        !self.config.api_base_url.is_empty() && !self.config.access_token.is_empty()
    }
}
