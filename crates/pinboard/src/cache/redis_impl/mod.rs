//! Redis cache backend implementation.
//!
//! Provides a distributed cache using Redis for multi-worker and
//! multi-instance deployments. Supports connection management with
//! timeouts, TTL, `SCAN`-based pattern deletion and pipelined batches.

mod cache;
mod error;

pub use cache::RedisCache;
