//! Shared reqwest plumbing for the vendor clients

use reqwest::StatusCode;
use std::time::Duration;

use oc_core::{ChannelType, DomainError};

use crate::error::InfrastructureError;

/// Longest vendor body excerpt carried into an error message
const BODY_EXCERPT: usize = 200;

/// Build the HTTP client shared by every provider
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, InfrastructureError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(InfrastructureError::Http)
}

/// Network failures and timeouts are always worth another attempt
pub(crate) fn transport_error(channel: ChannelType, err: reqwest::Error) -> DomainError {
    DomainError::transient(channel, format!("request failed: {}", err))
}

/// Map a non-2xx vendor answer onto the error taxonomy
///
/// 5xx, 408 and 429 are transient. A rejected static credential is a
/// configuration problem. Any other 4xx rejects this particular message.
pub(crate) fn status_error(channel: ChannelType, status: StatusCode, body: &str) -> DomainError {
    let excerpt: String = body.chars().take(BODY_EXCERPT).collect();

    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        return DomainError::transient(channel, format!("vendor returned {}: {}", status, excerpt));
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return DomainError::configuration(format!(
            "{} vendor rejected the configured credentials ({})",
            channel, status
        ));
    }

    DomainError::Validation {
        message: format!("{} vendor rejected the message ({}): {}", channel, status, excerpt),
    }
}

/// First string found under any of `fields` in a JSON body
pub(crate) fn message_id_from(body: &serde_json::Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| body.get(*field).and_then(|v| v.as_str()))
        .map(str::to_string)
}
