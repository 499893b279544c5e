//! Chat platform provider with expiring, refreshable credentials

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use oc_core::{
    render_otp_message, retry_with_backoff, BackoffConfig, ChannelCredential, ChannelProvider,
    ChannelType, CredentialRepository, DomainError, DomainResult, TokenGrant,
};
use oc_shared::config::ChatPlatformConfig;
use oc_shared::utils::mask::mask_receiver;

use super::http::{message_id_from, status_error, transport_error};

/// Error codes the platform uses for an invalid or expired access token
const AUTH_INVALID_CODES: &[&str] = &["invalid_auth", "token_expired", "token_revoked"];

/// Vendor calls made by [`ChatPlatformProvider`]
#[async_trait]
pub trait ChatPlatformApi: Send + Sync {
    /// Post the templated OTP message
    ///
    /// Returns `DomainError::AuthExpired` when the platform rejects `access_token`.
    async fn send_template(
        &self,
        access_token: &str,
        receiver: &str,
        otp: &str,
        message: &str,
    ) -> DomainResult<String>;

    /// Exchange `refresh_token` for a new grant
    async fn refresh_token(&self, refresh_token: &str) -> DomainResult<TokenGrant>;
}

/// reqwest implementation of [`ChatPlatformApi`]
pub struct HttpChatPlatformApi {
    client: reqwest::Client,
    config: ChatPlatformConfig,
}

impl HttpChatPlatformApi {
    pub fn new(client: reqwest::Client, config: ChatPlatformConfig) -> Self {
        Self { client, config }
    }

    fn template_url(&self) -> String {
        format!(
            "{}/messages/template",
            self.config.api_base_url.trim_end_matches('/')
        )
    }
}

fn error_code(body: &serde_json::Value) -> Option<&str> {
    body.pointer("/error/code")
        .or_else(|| body.get("error"))
        .and_then(|code| code.as_str())
}

#[async_trait]
impl ChatPlatformApi for HttpChatPlatformApi {
    async fn send_template(
        &self,
        access_token: &str,
        receiver: &str,
        otp: &str,
        message: &str,
    ) -> DomainResult<String> {
        let body = json!({
            "channel": receiver,
            "template_id": self.config.template_id,
            "parameters": { "code": otp },
            "text": message,
        });

        let response = self
            .client
            .post(self.template_url())
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(ChannelType::ChatPlatform, e))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let json = serde_json::from_str::<serde_json::Value>(&text).unwrap_or_default();

        // The platform reports some auth failures with a 200 and `ok: false`
        let auth_invalid = error_code(&json).map_or(false, |code| AUTH_INVALID_CODES.contains(&code));
        if status == StatusCode::UNAUTHORIZED || auth_invalid {
            return Err(DomainError::AuthExpired {
                channel: ChannelType::ChatPlatform,
            });
        }

        if !status.is_success() {
            return Err(status_error(ChannelType::ChatPlatform, status, &text));
        }

        if json.get("ok").and_then(|ok| ok.as_bool()) == Some(false) {
            return Err(DomainError::Validation {
                message: format!(
                    "chat platform rejected the message: {}",
                    error_code(&json).unwrap_or("unknown_error")
                ),
            });
        }

        Ok(message_id_from(&json, &["message_id", "ts", "id"])
            .unwrap_or_else(|| format!("chat-{}", Uuid::new_v4())))
    }

    async fn refresh_token(&self, refresh_token: &str) -> DomainResult<TokenGrant> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(ChannelType::ChatPlatform, e))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status.is_success() {
            return serde_json::from_str::<TokenGrant>(&text).map_err(DomainError::from);
        }

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(DomainError::configuration(format!(
                "chat platform refused the refresh token ({})",
                status
            )));
        }

        Err(status_error(ChannelType::ChatPlatform, status, &text))
    }
}

/// Stateful provider for one tenant's chat platform workspace
///
/// The live credential sits behind a short-lived lock that is only taken to
/// snapshot or swap the `Arc`. Refreshes are serialized by a separate async
/// gate so concurrent senders that all saw an expired token trigger one
/// vendor refresh between them.
pub struct ChatPlatformProvider {
    tenant_id: String,
    api: Arc<dyn ChatPlatformApi>,
    repository: Arc<dyn CredentialRepository>,
    credential: Mutex<Arc<ChannelCredential>>,
    refresh_gate: tokio::sync::Mutex<()>,
    backoff: BackoffConfig,
}

impl ChatPlatformProvider {
    pub fn new(
        tenant_id: impl Into<String>,
        api: Arc<dyn ChatPlatformApi>,
        repository: Arc<dyn CredentialRepository>,
        credential: ChannelCredential,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            api,
            repository,
            credential: Mutex::new(Arc::new(credential)),
            refresh_gate: tokio::sync::Mutex::new(()),
            backoff: BackoffConfig::default(),
        }
    }

    /// Build the provider from the stored credential, seeding the store from
    /// `config` on first start
    pub async fn bootstrap(
        tenant_id: &str,
        api: Arc<dyn ChatPlatformApi>,
        repository: Arc<dyn CredentialRepository>,
        config: &ChatPlatformConfig,
    ) -> DomainResult<Self> {
        if let Some(stored) = repository.get(tenant_id).await? {
            debug!(tenant_id = %tenant_id, event = "chat_platform_credential_loaded");
            return Ok(Self::new(tenant_id, api, repository, stored));
        }

        let (access_token, refresh_token) = match (
            &config.initial_access_token,
            &config.initial_refresh_token,
        ) {
            (Some(access), Some(refresh)) => (access.clone(), refresh.clone()),
            _ => {
                return Err(DomainError::configuration(format!(
                    "no chat platform credential stored or configured for tenant {}",
                    tenant_id
                )))
            }
        };

        // Unknown expiry: the first refresh run replaces it
        let credential = ChannelCredential::new(
            tenant_id,
            ChannelType::ChatPlatform,
            access_token,
            refresh_token,
            None,
        );
        repository.save(&credential).await?;
        info!(tenant_id = %tenant_id, event = "chat_platform_credential_seeded");

        Ok(Self::new(tenant_id, api, repository, credential))
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Snapshot of the live credential
    pub fn current_credential(&self) -> Arc<ChannelCredential> {
        self.credential.lock().clone()
    }

    /// Replace `stale` with a refreshed credential
    ///
    /// If another task already swapped `stale` out while this one waited on
    /// the gate, the newer credential is returned without a vendor call. A
    /// newer credential saved by another instance is adopted the same way.
    async fn refresh_from(
        &self,
        stale: &Arc<ChannelCredential>,
    ) -> DomainResult<Arc<ChannelCredential>> {
        let _gate = self.refresh_gate.lock().await;

        let current = self.current_credential();
        if !Arc::ptr_eq(&current, stale) {
            debug!(tenant_id = %self.tenant_id, event = "chat_platform_refresh_reused");
            return Ok(current);
        }

        let base = match self.load_newer_stored(&current).await {
            Some(stored) if !stored.is_expired(Utc::now()) => {
                *self.credential.lock() = Arc::clone(&stored);
                info!(
                    tenant_id = %self.tenant_id,
                    expires_at = ?stored.expires_at,
                    event = "chat_platform_credential_adopted"
                );
                return Ok(stored);
            }
            // Expired, but it holds the newest refresh token
            Some(stored) => stored,
            None => current,
        };

        let grant = retry_with_backoff(&self.backoff, "chat_platform_refresh", || {
            let api = Arc::clone(&self.api);
            let refresh_token = base.refresh_token.clone();
            async move { api.refresh_token(&refresh_token).await }
        })
        .await?;

        // The vendor may have rotated the refresh token; the new pair must be
        // live before anything else can fail
        let next = Arc::new(base.rotate(grant));
        *self.credential.lock() = Arc::clone(&next);

        if let Err(e) = self.repository.save(&next).await {
            warn!(
                tenant_id = %self.tenant_id,
                error = %e,
                event = "chat_platform_credential_persist_failed"
            );
        }

        info!(
            tenant_id = %self.tenant_id,
            expires_at = ?next.expires_at,
            event = "chat_platform_credential_refreshed"
        );
        Ok(next)
    }

    /// Stored credential issued after `current`, written by another instance
    async fn load_newer_stored(
        &self,
        current: &ChannelCredential,
    ) -> Option<Arc<ChannelCredential>> {
        match self.repository.get(&self.tenant_id).await {
            Ok(Some(stored)) if stored.issued_at > current.issued_at => Some(Arc::new(stored)),
            Ok(_) => None,
            Err(e) => {
                warn!(
                    tenant_id = %self.tenant_id,
                    error = %e,
                    event = "chat_platform_credential_reload_failed"
                );
                None
            }
        }
    }
}

#[async_trait]
impl ChannelProvider for ChatPlatformProvider {
    async fn send_otp(
        &self,
        tenant_id: &str,
        receiver: &str,
        otp: &str,
        ttl: Duration,
    ) -> DomainResult<String> {
        if tenant_id != self.tenant_id {
            return Err(DomainError::configuration(format!(
                "chat platform provider for {} cannot send for {}",
                self.tenant_id, tenant_id
            )));
        }

        let message = render_otp_message(otp, ttl);
        let credential = self.current_credential();

        match self
            .api
            .send_template(&credential.access_token, receiver, otp, &message)
            .await
        {
            Err(DomainError::AuthExpired { .. }) => {
                warn!(
                    tenant_id = %tenant_id,
                    receiver = %mask_receiver(receiver),
                    event = "chat_platform_auth_invalid"
                );
            }
            other => return other,
        }

        let refreshed = self.refresh_from(&credential).await?;

        match self
            .api
            .send_template(&refreshed.access_token, receiver, otp, &message)
            .await
        {
            Err(DomainError::AuthExpired { .. }) => Err(DomainError::transient(
                ChannelType::ChatPlatform,
                "credential rejected again after refresh",
            )),
            other => other,
        }
    }

    async fn refresh_credential(&self, tenant_id: &str) -> DomainResult<()> {
        if tenant_id != self.tenant_id {
            return Err(DomainError::configuration(format!(
                "chat platform provider for {} cannot refresh {}",
                self.tenant_id, tenant_id
            )));
        }

        let stale = self.current_credential();
        self.refresh_from(&stale).await.map(|_| ())
    }

    fn channel_type(&self) -> ChannelType {
        ChannelType::ChatPlatform
    }

    async fn health_check(&self) -> bool {
        !self.current_credential().access_token.is_empty()
    }

    fn credential_expires_at(&self) -> Option<DateTime<Utc>> {
        self.current_credential().expires_at
    }
}
