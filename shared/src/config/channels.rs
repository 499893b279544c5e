//! Notification channel configuration module
//!
//! Every channel is optional: a channel whose required settings are absent is
//! simply not registered for any tenant.

use serde::{Deserialize, Serialize};
use std::env;

use super::env_or;

/// SMS vendor settings (basic-auth form POST API)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsVendorConfig {
    /// Full URL of the vendor's messages endpoint
    pub endpoint: String,
    /// Account identifier used as basic-auth user
    pub account_id: String,
    /// Auth token used as basic-auth password
    pub auth_token: String,
    /// Sender number or alphanumeric sender id
    pub from: String,
}

/// Chat-platform template messaging settings (expiring OAuth-style credentials)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatPlatformConfig {
    /// Base URL of the messaging API
    pub api_base_url: String,
    /// OAuth token endpoint used for refresh
    pub token_url: String,
    /// Client identifier
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Template used for OTP messages
    pub template_id: String,
    /// Bootstrap access token used when no stored credential exists
    #[serde(default)]
    pub initial_access_token: Option<String>,
    /// Bootstrap refresh token used when no stored credential exists
    #[serde(default)]
    pub initial_refresh_token: Option<String>,
}

/// Generic webhook settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookConfig {
    /// Endpoint receiving the JSON payload
    pub url: String,
    /// Optional bearer token sent with every request
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// Messaging-app settings (long-lived bearer token)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessagingAppConfig {
    /// Base URL of the messaging app API
    pub api_base_url: String,
    /// Sender identifier registered with the messaging app
    pub sender_id: String,
    /// Long-lived access token
    pub access_token: String,
}

/// All channel settings plus the credential encryption key
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChannelsConfig {
    /// Tenants served by this instance
    pub tenants: Vec<String>,
    /// Timeout for every vendor request in seconds
    pub request_timeout_seconds: u64,
    /// Base64 encoded 256-bit key protecting stored credentials
    #[serde(default)]
    pub credential_key: Option<String>,
    #[serde(default)]
    pub sms: Option<SmsVendorConfig>,
    #[serde(default)]
    pub chat_platform: Option<ChatPlatformConfig>,
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
    #[serde(default)]
    pub messaging_app: Option<MessagingAppConfig>,
}

impl ChannelsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let tenants = env::var("OTP_TENANTS")
            .map(|v| parse_list(&v))
            .unwrap_or_else(|_| vec![String::from("default")]);

        let sms = match (
            env::var("SMS_ENDPOINT"),
            env::var("SMS_ACCOUNT_ID"),
            env::var("SMS_AUTH_TOKEN"),
            env::var("SMS_FROM"),
        ) {
            (Ok(endpoint), Ok(account_id), Ok(auth_token), Ok(from)) => Some(SmsVendorConfig {
                endpoint,
                account_id,
                auth_token,
                from,
            }),
            _ => None,
        };

        let chat_platform = match (
            env::var("CHAT_API_BASE_URL"),
            env::var("CHAT_TOKEN_URL"),
            env::var("CHAT_CLIENT_ID"),
            env::var("CHAT_CLIENT_SECRET"),
            env::var("CHAT_TEMPLATE_ID"),
        ) {
            (Ok(api_base_url), Ok(token_url), Ok(client_id), Ok(client_secret), Ok(template_id)) => {
                Some(ChatPlatformConfig {
                    api_base_url,
                    token_url,
                    client_id,
                    client_secret,
                    template_id,
                    initial_access_token: env::var("CHAT_ACCESS_TOKEN").ok(),
                    initial_refresh_token: env::var("CHAT_REFRESH_TOKEN").ok(),
                })
            }
            _ => None,
        };

        let webhook = env::var("WEBHOOK_URL").ok().map(|url| WebhookConfig {
            url,
            auth_token: env::var("WEBHOOK_AUTH_TOKEN").ok(),
        });

        let messaging_app = match (
            env::var("MESSAGING_API_BASE_URL"),
            env::var("MESSAGING_SENDER_ID"),
            env::var("MESSAGING_ACCESS_TOKEN"),
        ) {
            (Ok(api_base_url), Ok(sender_id), Ok(access_token)) => Some(MessagingAppConfig {
                api_base_url,
                sender_id,
                access_token,
            }),
            _ => None,
        };

        Self {
            tenants,
            request_timeout_seconds: env_or("CHANNEL_REQUEST_TIMEOUT_SECONDS", 10),
            credential_key: env::var("CREDENTIAL_ENCRYPTION_KEY").ok(),
            sms,
            chat_platform,
            webhook,
            messaging_app,
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
