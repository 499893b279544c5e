//! Channel credential entity for providers with expiring tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::channel::ChannelType;

/// Access/refresh token pair owned by one provider instance per tenant
///
/// Exactly one live credential exists per (tenant, channel). A refresh produces
/// a whole new value that replaces the old one; fields are never patched in
/// place, so a reader never sees a new access token next to an old refresh token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCredential {
    pub tenant_id: String,
    pub channel: ChannelType,
    pub access_token: String,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
    /// `None` when the vendor did not report a lifetime
    pub expires_at: Option<DateTime<Utc>>,
}

impl ChannelCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        channel: ChannelType,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: Option<Duration>,
    ) -> Self {
        let issued_at = Utc::now();
        Self {
            tenant_id: tenant_id.into(),
            channel,
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            issued_at,
            expires_at: expires_in.map(|ttl| issued_at + ttl),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires_at| expires_at <= now)
    }

    /// Whether the credential expires within `window` of `now`
    ///
    /// A credential without a known expiry is always considered due.
    pub fn expires_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires_at| expires_at <= now + window)
    }

    /// Build the successor credential from a refresh grant
    ///
    /// Vendors that do not rotate refresh tokens omit it from the grant; the
    /// current refresh token is carried over in that case.
    pub fn rotate(&self, grant: TokenGrant) -> Self {
        let issued_at = Utc::now();
        Self {
            tenant_id: self.tenant_id.clone(),
            channel: self.channel,
            access_token: grant.access_token,
            refresh_token: grant
                .refresh_token
                .unwrap_or_else(|| self.refresh_token.clone()),
            issued_at,
            expires_at: grant
                .expires_in
                .map(|secs| issued_at + Duration::seconds(secs as i64)),
        }
    }
}

impl fmt::Debug for ChannelCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelCredential")
            .field("tenant_id", &self.tenant_id)
            .field("channel", &self.channel)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Result of a successful refresh call
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
