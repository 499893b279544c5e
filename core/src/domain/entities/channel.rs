//! Notification channel identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A notification transport an OTP can be delivered over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    /// SMS through a vendor HTTP API
    Sms,
    /// Chat-platform template message, authenticated with expiring tokens
    ChatPlatform,
    /// Generic webhook POST
    Webhook,
    /// Messaging-app message with a long-lived token
    MessagingApp,
}

impl ChannelType {
    /// All known channels
    pub const ALL: [ChannelType; 4] = [
        ChannelType::Sms,
        ChannelType::ChatPlatform,
        ChannelType::Webhook,
        ChannelType::MessagingApp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Sms => "sms",
            ChannelType::ChatPlatform => "chat_platform",
            ChannelType::Webhook => "webhook",
            ChannelType::MessagingApp => "messaging_app",
        }
    }

    /// Whether the channel authenticates with credentials that expire and
    /// need a refresh handshake
    pub fn has_expiring_credentials(&self) -> bool {
        matches!(self, ChannelType::ChatPlatform)
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sms" => Ok(ChannelType::Sms),
            "chat_platform" | "chat" => Ok(ChannelType::ChatPlatform),
            "webhook" => Ok(ChannelType::Webhook),
            "messaging_app" | "whatsapp" => Ok(ChannelType::MessagingApp),
            _ => Err(format!("Unknown channel: {}", s)),
        }
    }
}
