//! In-memory cache implementation using moka

use async_trait::async_trait;
use moka::future::{Cache, CacheBuilder};
use moka::notification::RemovalCause;
use moka::Expiry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

use oc_core::{CounterStore, DomainError, DomainResult};

/// Fallback lifetime when a requested TTL does not fit the clock
const MAX_TTL_SECS: u64 = 365 * 24 * 3600;

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
    expires_at: Instant,
}

/// Expiry policy reading each entry's own TTL
struct PerEntryExpiry;

impl Expiry<String, Entry> for PerEntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local string store with a TTL per entry
///
/// A bounded cache evicts live entries once it is full; every such eviction
/// is logged and counted.
pub struct MemoryCache {
    cache: Cache<String, Entry>,
    evictions: Arc<AtomicU64>,
}

impl MemoryCache {
    /// Create a cache holding at most `max_capacity` entries
    pub fn new(max_capacity: u64) -> Self {
        Self::build(Cache::builder().max_capacity(max_capacity))
    }

    /// Create a cache bounded only by the TTL of its entries
    pub fn unbounded() -> Self {
        Self::build(Cache::builder())
    }

    fn build(builder: CacheBuilder<String, Entry, Cache<String, Entry>>) -> Self {
        let evictions = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&evictions);
        let cache = builder
            .expire_after(PerEntryExpiry)
            .eviction_listener(move |key: Arc<String>, _value: Entry, cause: RemovalCause| {
                if cause == RemovalCause::Size {
                    counter.fetch_add(1, Ordering::Relaxed);
                    warn!(key = %key, event = "memory_cache_evicted", "Live entry evicted, cache is full");
                }
            })
            .build();
        Self { cache, evictions }
    }

    /// Live entries dropped because the cache was full
    pub fn eviction_count(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.cache
            .get(key)
            .await
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value)
    }

    /// Insert or overwrite `key`, expiring `ttl` from now
    pub async fn set_with_expiry(&self, key: &str, value: String, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + Duration::from_secs(MAX_TTL_SECS));
        let entry = Entry {
            value,
            ttl,
            expires_at,
        };
        self.cache.insert(key.to_string(), entry).await;
    }

    pub async fn delete(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Live entries whose key starts with `prefix`
    pub fn scan_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        let now = Instant::now();
        self.cache
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && entry.expires_at > now)
            .map(|(key, entry)| (key.as_ref().clone(), entry.value))
            .collect()
    }

    /// Approximate number of entries, expired ones included until evicted
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Apply pending inserts and evictions now instead of on the next access
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl CounterStore for MemoryCache {
    async fn get_count(&self, key: &str) -> DomainResult<Option<u64>> {
        match self.get(key).await {
            Some(raw) => raw.parse::<u64>().map(Some).map_err(|e| DomainError::Internal {
                message: format!("Corrupt counter at {}: {}", key, e),
            }),
            None => Ok(None),
        }
    }

    async fn set_count(&self, key: &str, count: u64, window: Duration) -> DomainResult<()> {
        self.set_with_expiry(key, count.to_string(), window).await;
        Ok(())
    }

    async fn delete_count(&self, key: &str) -> DomainResult<()> {
        self.delete(key).await;
        Ok(())
    }
}
