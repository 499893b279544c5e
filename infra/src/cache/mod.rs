//! Key/value stores backing the OTP queue, counters and credentials
//!
//! - [`MemoryCache`]: moka cache with per-entry expiry, one process only
//! - [`RedisClient`]: shared Redis connection with retry on transient errors
//!
//! Both implement the rate limiter's `CounterStore`.

pub mod memory_cache;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use memory_cache::MemoryCache;
pub use redis_client::RedisClient;
