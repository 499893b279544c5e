//! Channel provider implementations
//!
//! - [`SmsVendorProvider`]: form POST with basic auth
//! - [`ChatPlatformProvider`]: template messages with expiring OAuth-style tokens
//! - [`WebhookProvider`]: JSON POST to a tenant endpoint
//! - [`MessagingAppProvider`]: long-lived bearer token

pub mod chat_platform;
mod http;
pub mod messaging_app;
pub mod sms;
pub mod webhook;

#[cfg(test)]
mod tests;

pub use chat_platform::{ChatPlatformApi, ChatPlatformProvider, HttpChatPlatformApi};
pub use http::build_http_client;
pub use messaging_app::MessagingAppProvider;
pub use sms::SmsVendorProvider;
pub use webhook::WebhookProvider;
