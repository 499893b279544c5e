//! Redis cache client implementation
//!
//! This module provides a Redis client with connection retry and the handful of
//! operations the queue, the counters and the credential store need: plain
//! values with millisecond expiry, cursor-based key scans and per-key sorted
//! sets replaced inside a `MULTI` transaction.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use oc_core::{CounterStore, DomainError, DomainResult};
use oc_shared::CacheConfig;

use crate::error::InfrastructureError;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Keys fetched per SCAN round trip
const SCAN_BATCH: usize = 200;

/// Redis client with connection retry logic
///
/// Cloning is cheap: all clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    /// Maximum number of attempts per operation
    max_retries: u32,
    /// Base delay between attempts (exponential backoff)
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Connect using the URL and retry settings of `config`
    pub async fn new(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), event = "redis_connecting");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let max_retries = config.max_retries.max(1);
        let connection =
            Self::create_connection_with_retry(client, max_retries, config.retry_delay_ms).await?;

        info!(event = "redis_connected");

        Ok(Self {
            connection,
            max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Set `key` to `value` with a millisecond expiry (`SET key value PX ttl`)
    pub async fn set_with_expiry_ms(
        &self,
        key: &str,
        value: &str,
        ttl_ms: u64,
    ) -> Result<(), InfrastructureError> {
        let key = key.to_string();
        let value = value.to_string();
        let ttl_ms = ttl_ms.max(1);
        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            let value = value.clone();
            Box::pin(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("PX")
                    .arg(ttl_ms)
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Set `key` to `value` without expiry
    pub async fn set(&self, key: &str, value: &str) -> Result<(), InfrastructureError> {
        let key = key.to_string();
        let value = value.to_string();
        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            let value = value.clone();
            Box::pin(async move { conn.set::<_, _, ()>(key, value).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let key = key.to_string();
        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Delete `key`; returns whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = key.to_string();
        let deleted = self
            .execute_with_retry(move |mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await
            .map_err(InfrastructureError::Cache)?;
        Ok(deleted > 0)
    }

    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = key.to_string();
        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            Box::pin(async move { conn.exists::<_, bool>(key).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// All keys matching `pattern`, collected with a cursor-based `SCAN`
    pub async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, InfrastructureError> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let pattern = pattern.to_string();
            let (next, batch): (u64, Vec<String>) = self
                .execute_with_retry(move |mut conn| {
                    let pattern = pattern.clone();
                    Box::pin(async move {
                        redis::cmd("SCAN")
                            .arg(cursor)
                            .arg("MATCH")
                            .arg(pattern)
                            .arg("COUNT")
                            .arg(SCAN_BATCH)
                            .query_async::<_, (u64, Vec<String>)>(&mut conn)
                            .await
                    })
                })
                .await
                .map_err(InfrastructureError::Cache)?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// Members of the sorted set at `key` scored within `[min, max]`
    pub async fn zrangebyscore(
        &self,
        key: &str,
        min: i64,
        max: i64,
    ) -> Result<Vec<String>, InfrastructureError> {
        let key = key.to_string();
        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            Box::pin(async move {
                redis::cmd("ZRANGEBYSCORE")
                    .arg(key)
                    .arg(min)
                    .arg(max)
                    .query_async::<_, Vec<String>>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Every member of the sorted set at `key`
    pub async fn zrange_all(&self, key: &str) -> Result<Vec<String>, InfrastructureError> {
        let key = key.to_string();
        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            Box::pin(async move {
                redis::cmd("ZRANGE")
                    .arg(key)
                    .arg(0)
                    .arg(-1)
                    .query_async::<_, Vec<String>>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Make `member` the only element of the sorted set at `key`
    ///
    /// `DEL`, `ZADD` and `EXPIRE` run in one `MULTI` transaction.
    pub async fn replace_sorted_set(
        &self,
        key: &str,
        member: &str,
        score: i64,
        expiry: Duration,
    ) -> Result<(), InfrastructureError> {
        let key = key.to_string();
        let member = member.to_string();
        let expiry_secs = expiry.as_secs().max(1);
        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            let member = member.clone();
            Box::pin(async move {
                redis::pipe()
                    .atomic()
                    .cmd("DEL")
                    .arg(&key)
                    .ignore()
                    .cmd("ZADD")
                    .arg(&key)
                    .arg(score)
                    .arg(member)
                    .ignore()
                    .cmd("EXPIRE")
                    .arg(&key)
                    .arg(expiry_secs)
                    .ignore()
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    pub async fn health_check(&self) -> bool {
        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) => response == "PONG",
            Err(e) => {
                error!("Redis health check failed: {}", e);
                false
            }
        }
    }

    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl CounterStore for RedisClient {
    async fn get_count(&self, key: &str) -> DomainResult<Option<u64>> {
        match self.get(key).await? {
            Some(raw) => raw.parse::<u64>().map(Some).map_err(|e| DomainError::Internal {
                message: format!("Corrupt counter at {}: {}", key, e),
            }),
            None => Ok(None),
        }
    }

    async fn set_count(&self, key: &str, count: u64, window: Duration) -> DomainResult<()> {
        let ttl_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self.set_with_expiry_ms(key, &count.to_string(), ttl_ms).await?;
        Ok(())
    }

    async fn delete_count(&self, key: &str) -> DomainResult<()> {
        self.delete(key).await?;
        Ok(())
    }
}

pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Hide the password part of a Redis URL
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.find(':') {
                Some(colon) => format!(
                    "{}{}:****{}",
                    &url[..scheme_end + 3],
                    &credentials[..colon],
                    &url[at..]
                ),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
