//! # Infrastructure Layer
//!
//! Concrete implementations of the ports defined in `oc_core`:
//!
//! - **Cache**: moka-backed process cache and the Redis client
//! - **Queue**: pending items and retry tasks on either backend
//! - **Credential**: encrypted credential repositories
//! - **Channels**: reqwest clients for every notification vendor
//! - **Container**: wiring of all of the above from [`oc_shared::AppConfig`]

pub mod cache;
pub mod channels;
pub mod container;
pub mod credential;
pub mod error;
pub mod queue;

pub use cache::{MemoryCache, RedisClient};
pub use channels::{
    ChatPlatformApi, ChatPlatformProvider, HttpChatPlatformApi, MessagingAppProvider,
    SmsVendorProvider, WebhookProvider,
};
pub use container::ServiceContainer;
pub use credential::{MemoryCredentialRepository, RedisCredentialRepository};
pub use error::InfrastructureError;
pub use queue::{MemoryOtpQueue, RedisOtpQueue};
