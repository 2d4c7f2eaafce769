//! Cache backends and the cache service built on top of them.
//!
//! The backend behind the [`pinboard_core::cache::Cache`] port is selected
//! at compile time via feature flags. Handlers never see the backend: they
//! go through [`CacheService`], which is constructed once in `AppState`.
//!
//! # Feature Flags
//!
//! - `memory` (default): In-memory LRU cache, one per process
//! - `redis`: Redis cache shared by every worker and instance
//!
//! These features are mutually exclusive - only one cache backend can be
//! enabled at a time.

#[cfg(any(feature = "memory", test))]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

mod middleware;
mod service;

#[cfg(any(feature = "memory", test))]
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;

pub use middleware::{cache_response, ResponseCache};
pub use service::CacheService;

#[cfg(test)]
pub(crate) use service::test_support;
