//! OTP queue backends
//!
//! [`MemoryOtpQueue`] keeps everything in the process-local cache and suits a
//! single instance. [`RedisOtpQueue`] shares the queue across instances.

pub mod memory_queue;
pub mod redis_queue;

#[cfg(test)]
mod tests;

pub use memory_queue::MemoryOtpQueue;
pub use redis_queue::RedisOtpQueue;
