//! Wiring of the concrete infrastructure behind the core services

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use oc_core::{
    ChannelProvider, ChannelType, CounterStore, CourierConfig, CourierService, CredentialCipher,
    CredentialRepository, FixedWindowRateLimiter, OtpQueue, RetryWorker, StaticProviderRegistry,
    TokenRefreshWorker,
};
use oc_shared::config::{AppConfig, ChannelsConfig, QueueBackend};

use crate::cache::{MemoryCache, RedisClient};
use crate::channels::{
    build_http_client, ChatPlatformProvider, HttpChatPlatformApi, MessagingAppProvider,
    SmsVendorProvider, WebhookProvider,
};
use crate::credential::{MemoryCredentialRepository, RedisCredentialRepository};
use crate::error::InfrastructureError;
use crate::queue::{MemoryOtpQueue, RedisOtpQueue};

/// Applied when no vendor timeout is configured
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Every long-lived component of a running instance
pub struct ServiceContainer {
    pub queue: Arc<dyn OtpQueue>,
    pub counters: Arc<dyn CounterStore>,
    pub credentials: Arc<dyn CredentialRepository>,
    pub providers: Arc<StaticProviderRegistry>,
    pub rate_limiter: Arc<FixedWindowRateLimiter>,
    pub courier: Arc<CourierService>,
    pub retry_worker: Arc<RetryWorker>,
    pub token_refresh_worker: Arc<TokenRefreshWorker>,
}

impl ServiceContainer {
    /// Connect the configured backend and register providers for every tenant
    pub async fn build(config: &AppConfig) -> Result<Self, InfrastructureError> {
        let cipher = Arc::new(load_cipher(&config.channels)?);
        let retention = config.worker.retry_retention();

        let (queue, counters, credentials): (
            Arc<dyn OtpQueue>,
            Arc<dyn CounterStore>,
            Arc<dyn CredentialRepository>,
        ) = match config.cache.backend {
            QueueBackend::Memory => {
                // Queue entries leave only by TTL; capacity bounds the counters alone
                let queue: Arc<dyn OtpQueue> = Arc::new(MemoryOtpQueue::new(
                    Arc::new(MemoryCache::unbounded()),
                    retention,
                ));
                let cache = Arc::new(MemoryCache::new(config.cache.memory_max_capacity));
                let credentials: Arc<dyn CredentialRepository> = Arc::new(
                    MemoryCredentialRepository::new(ChannelType::ChatPlatform, cipher),
                );
                let counters: Arc<dyn CounterStore> = cache;
                (queue, counters, credentials)
            }
            QueueBackend::Redis => {
                let client = Arc::new(RedisClient::new(&config.cache).await?);
                let queue: Arc<dyn OtpQueue> =
                    Arc::new(RedisOtpQueue::new(client.clone(), retention));
                let credentials: Arc<dyn CredentialRepository> = Arc::new(
                    RedisCredentialRepository::new(ChannelType::ChatPlatform, cipher, client.clone()),
                );
                let counters: Arc<dyn CounterStore> = client;
                (queue, counters, credentials)
            }
        };

        let providers = Arc::new(StaticProviderRegistry::new());
        register_providers(&providers, &config.channels, credentials.clone()).await?;

        let rate_limiter = Arc::new(FixedWindowRateLimiter::new(counters.clone()));
        let courier = Arc::new(CourierService::new(
            queue.clone(),
            rate_limiter.clone(),
            providers.clone(),
            CourierConfig::from_config(&config.worker, &config.rate_limit),
        ));
        let retry_worker = Arc::new(RetryWorker::new(queue.clone(), courier.clone()));
        let token_refresh_worker = Arc::new(TokenRefreshWorker::new(
            providers.clone(),
            Duration::from_secs(config.worker.refresh_ahead_seconds),
        ));

        info!(
            backend = ?config.cache.backend,
            tenants = config.channels.tenants.len(),
            providers = providers.len(),
            event = "container_ready"
        );

        Ok(Self {
            queue,
            counters,
            credentials,
            providers,
            rate_limiter,
            courier,
            retry_worker,
            token_refresh_worker,
        })
    }
}

fn load_cipher(channels: &ChannelsConfig) -> Result<CredentialCipher, InfrastructureError> {
    match &channels.credential_key {
        Some(encoded) => CredentialCipher::from_base64(encoded)
            .map_err(|e| InfrastructureError::Config(e.to_string())),
        None => {
            warn!(
                event = "credential_key_generated",
                "No credential key configured; stored credentials will not survive a restart"
            );
            Ok(CredentialCipher::generate())
        }
    }
}

async fn register_providers(
    registry: &StaticProviderRegistry,
    channels: &ChannelsConfig,
    credentials: Arc<dyn CredentialRepository>,
) -> Result<(), InfrastructureError> {
    let timeout_secs = match channels.request_timeout_seconds {
        0 => DEFAULT_REQUEST_TIMEOUT_SECS,
        secs => secs,
    };
    let client = build_http_client(Duration::from_secs(timeout_secs))?;

    // Static credentials: one instance serves every tenant
    let mut shared: Vec<Arc<dyn ChannelProvider>> = Vec::new();
    if let Some(sms) = &channels.sms {
        shared.push(Arc::new(SmsVendorProvider::new(client.clone(), sms.clone())));
    }
    if let Some(webhook) = &channels.webhook {
        shared.push(Arc::new(WebhookProvider::new(client.clone(), webhook.clone())));
    }
    if let Some(messaging) = &channels.messaging_app {
        shared.push(Arc::new(MessagingAppProvider::new(
            client.clone(),
            messaging.clone(),
        )));
    }

    let chat_api = channels.chat_platform.as_ref().map(|chat| {
        (
            Arc::new(HttpChatPlatformApi::new(client.clone(), chat.clone())),
            chat,
        )
    });

    for tenant_id in &channels.tenants {
        for provider in &shared {
            registry.register(tenant_id.as_str(), provider.clone());
        }

        if let Some((api, chat)) = &chat_api {
            match ChatPlatformProvider::bootstrap(tenant_id, api.clone(), credentials.clone(), chat)
                .await
            {
                Ok(provider) => {
                    registry.register(tenant_id.as_str(), Arc::new(provider));
                }
                Err(e) => {
                    warn!(
                        tenant_id = %tenant_id,
                        error = %e,
                        event = "chat_platform_unavailable",
                        "Chat platform not registered for tenant"
                    );
                }
            }
        }
    }

    Ok(())
}
