//! SMS vendor provider

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use oc_core::{render_otp_message, ChannelProvider, ChannelType, DomainError, DomainResult};
use oc_shared::utils::mask::mask_receiver;
use oc_shared::config::SmsVendorConfig;

use super::http::{message_id_from, status_error, transport_error};

/// Sends through the vendor's messages endpoint with basic auth
///
/// Credentials never expire, so refreshing is a no-op.
pub struct SmsVendorProvider {
    client: reqwest::Client,
    config: SmsVendorConfig,
}

impl SmsVendorProvider {
    pub fn new(client: reqwest::Client, config: SmsVendorConfig) -> Self {
        Self { client, config }
    }

    fn is_configured(&self) -> bool {
        !self.config.endpoint.is_empty() && !self.config.account_id.is_empty()
    }
}

#[async_trait]
impl ChannelProvider for SmsVendorProvider {
    async fn send_otp(
        &self,
        tenant_id: &str,
        receiver: &str,
        otp: &str,
        ttl: Duration,
    ) -> DomainResult<String> {
        if !self.is_configured() {
            return Err(DomainError::configuration("SMS vendor endpoint or account is not configured"));
        }

        let message = render_otp_message(otp, ttl);
        let response = self
            .client
            .post(&self.config.endpoint)
            .basic_auth(&self.config.account_id, Some(&self.config.auth_token))
            .form(&[
                ("To", receiver),
                ("From", self.config.from.as_str()),
                ("Body", message.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(ChannelType::Sms, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(ChannelType::Sms, e))?;

        if !status.is_success() {
            return Err(status_error(ChannelType::Sms, status, &body));
        }

        let message_id = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| message_id_from(&json, &["sid", "message_id", "id"]))
            .unwrap_or_else(|| format!("sms-{}", Uuid::new_v4()));

        debug!(
            tenant_id = %tenant_id,
            receiver = %mask_receiver(receiver),
            message_id = %message_id,
            event = "sms_accepted"
        );
        Ok(message_id)
    }

    async fn refresh_credential(&self, _tenant_id: &str) -> DomainResult<()> {
        Ok(())
    }

    fn channel_type(&self) -> ChannelType {
        ChannelType::Sms
    }

    async fn health_check(&self) -> bool {
        self.is_configured()
    }
}
