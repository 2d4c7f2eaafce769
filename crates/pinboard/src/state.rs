//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. It holds repository trait objects for the store, the
//! one `CacheService` of the process, and the loaded configuration. Backends
//! are picked via feature flags.

use std::sync::Arc;

use pinboard_core::cache::Cache;
use pinboard_core::storage::{
    BoardRepository, CommentRepository, FollowRepository, InteractionRepository, PinRepository,
    UserRepository,
};

use crate::cache::CacheService;
use crate::config::Config;

// ============================================================================
// Compile-time feature validation
// ============================================================================

// Cache features: exactly one must be enabled, they are mutually exclusive
#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!("Cannot enable both 'memory' and 'redis' cache features");

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!("Must enable exactly one cache feature: 'memory' or 'redis'");

/// A store backing every repository trait.
pub trait Store:
    UserRepository
    + PinRepository
    + CommentRepository
    + BoardRepository
    + InteractionRepository
    + FollowRepository
    + 'static
{
}

impl<T> Store for T where
    T: UserRepository
        + PinRepository
        + CommentRepository
        + BoardRepository
        + InteractionRepository
        + FollowRepository
        + 'static
{
}

/// Shared application state.
///
/// Cloned for each request handler. Everything inside is reference counted,
/// so a clone is cheap and every clone sees the same store and cache.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub pins: Arc<dyn PinRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub boards: Arc<dyn BoardRepository>,
    pub interactions: Arc<dyn InteractionRepository>,
    pub follows: Arc<dyn FollowRepository>,
    /// Cache facade, constructed once per process.
    pub cache: CacheService,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState over one store and one cache backend.
    pub fn build<S: Store>(store: Arc<S>, cache: Arc<dyn Cache>, config: Config) -> Self {
        Self {
            users: store.clone(),
            pins: store.clone(),
            comments: store.clone(),
            boards: store.clone(),
            interactions: store.clone(),
            follows: store,
            cache: CacheService::new(cache, config.cache_ttl()),
            config: Arc::new(config),
        }
    }

    /// Creates AppState with the storage and cache backends selected at
    /// compile time.
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        let store = open_store(&config).await?;
        let cache = open_cache(&config).await?;
        Ok(Self::build(store, cache, config))
    }
}

// ============================================================================
// Factory functions for the different backends
// ============================================================================

#[cfg(feature = "inmemory")]
async fn open_store(
    _config: &Config,
) -> Result<Arc<crate::storage::InMemoryRepository>, anyhow::Error> {
    tracing::info!("Using in-memory storage");
    Ok(Arc::new(crate::storage::InMemoryRepository::new()))
}

#[cfg(feature = "sqlite")]
async fn open_store(
    config: &Config,
) -> Result<Arc<crate::storage::SqliteRepository>, anyhow::Error> {
    use std::time::Duration;

    tracing::info!(path = %config.sqlite_path, "Using SQLite storage");
    let repo = crate::storage::SqliteRepository::new(
        &config.sqlite_path,
        Duration::from_millis(config.sqlite_busy_timeout_ms),
    )
    .await?;
    Ok(Arc::new(repo))
}

#[cfg(feature = "memory")]
async fn open_cache(config: &Config) -> Result<Arc<dyn Cache>, anyhow::Error> {
    tracing::info!(max_entries = config.cache_max_entries, "Using in-memory cache");
    Ok(Arc::new(crate::cache::MemoryCache::new(
        config.cache_max_entries,
    )))
}

#[cfg(feature = "redis")]
async fn open_cache(config: &Config) -> Result<Arc<dyn Cache>, anyhow::Error> {
    use std::time::Duration;

    tracing::info!(url = %config.redis_url, "Using Redis cache");
    let cache = crate::cache::RedisCache::new(
        &config.redis_url,
        Duration::from_millis(config.redis_connect_timeout_ms),
        Duration::from_millis(config.redis_response_timeout_ms),
    )
    .await?;
    Ok(Arc::new(cache))
}

// ============================================================================
// Test support - provides Default implementation for unit tests
// ============================================================================
