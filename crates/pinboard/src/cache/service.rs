//! Cache service facade.
//!
//! `CacheService` is built once per process and cloned into every handler
//! through `AppState`. It layers JSON encoding and a default TTL over the
//! byte-oriented [`Cache`] port and owns the two policies every domain path
//! relies on:
//!
//! - **read path** ([`CacheService::get_or_fetch`]): a cache error or an
//!   undecodable entry counts as a miss, and a failed populate only logs.
//! - **write path** ([`CacheService::invalidate`]): invalidation failures
//!   are logged and never surface to the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use pinboard_core::cache::{deserialize, serialize, Cache, Result};

/// Typed, JSON-encoding facade over the configured cache backend.
#[derive(Clone)]
pub struct CacheService {
    cache: Arc<dyn Cache>,
    default_ttl: Duration,
}

impl CacheService {
    pub fn new(cache: Arc<dyn Cache>, default_ttl: Duration) -> Self {
        Self { cache, default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Fetches and decodes a value. `Ok(None)` on a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await? {
            Some(bytes) => deserialize(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Encodes and stores a value. `None` uses the default TTL.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let bytes = serialize(value)?;
        self.set_raw(key, &bytes, ttl).await
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.cache.get(key).await
    }

    pub async fn set_raw(&self, key: &str, bytes: &[u8], ttl: Option<Duration>) -> Result<()> {
        self.cache
            .set(key, bytes, Some(ttl.unwrap_or(self.default_ttl)))
            .await
    }

    pub async fn del(&self, key: &str) -> Result<()> {
        self.cache.delete(key).await
    }

    /// Deletes every key matching the glob `pattern`. Matching nothing is fine.
    pub async fn del_by_pattern(&self, pattern: &str) -> Result<()> {
        self.cache.delete_pattern(pattern).await
    }

    /// Fetches several values, one slot per key, in key order.
    ///
    /// An entry that no longer decodes reads as a miss.
    pub async fn mget<T: DeserializeOwned>(&self, keys: &[String]) -> Result<Vec<Option<T>>> {
        let values = self.cache.mget(keys).await?;
        Ok(keys
            .iter()
            .zip(values)
            .map(|(key, bytes)| {
                bytes.and_then(|bytes| match deserialize(&bytes) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        tracing::warn!(%key, error = %err, "Cache entry deserialization failed");
                        None
                    }
                })
            })
            .collect())
    }

    /// Stores several values sharing one TTL in a single backend round trip.
    pub async fn mset<T: Serialize>(
        &self,
        entries: &[(String, T)],
        ttl: Option<Duration>,
    ) -> Result<()> {
        let encoded = entries
            .iter()
            .map(|(key, value)| serialize(value).map(|bytes| (key.clone(), bytes)))
            .collect::<Result<Vec<_>>>()?;
        self.cache
            .mset(&encoded, Some(ttl.unwrap_or(self.default_ttl)))
            .await
    }

    /// Bumps the fixed-window counter at `key`.
    pub async fn increment(&self, key: &str, window: Duration) -> Result<u64> {
        self.cache.increment(key, window).await
    }

    /// Cache-aside read.
    ///
    /// Returns the cached value when present and decodable. Otherwise runs
    /// `fetch`, stores its `Ok` value under `key` and returns it. Errors from
    /// `fetch` are returned as-is and never cached.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => {
                if let Ok(value) = deserialize::<T>(&bytes) {
                    tracing::trace!(%key, "Cache hit");
                    return Ok(value);
                }
                // Deserialization failed - treat as cache miss
                tracing::warn!(%key, "Cache entry deserialization failed");
            }
            Ok(None) => tracing::trace!(%key, "Cache miss"),
            Err(err) => tracing::warn!(%key, error = %err, "Cache read failed, falling back to store"),
        }

        let value = fetch().await?;

        if let Err(err) = self.set(key, &value, ttl).await {
            tracing::warn!(%key, error = %err, "Failed to populate cache");
        }

        Ok(value)
    }

    /// Drops every listed key and every key matching one of `patterns`.
    ///
    /// Each deletion is attempted even if an earlier one failed.
    pub async fn invalidate(&self, keys: &[String], patterns: &[String]) {
        for key in keys {
            if let Err(err) = self.del(key).await {
                tracing::warn!(%key, error = %err, "Failed to invalidate cache key");
            }
        }
        for pattern in patterns {
            if let Err(err) = self.del_by_pattern(pattern).await {
                tracing::warn!(%pattern, error = %err, "Failed to invalidate cache pattern");
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FailingCache;
    use super::*;
    use crate::cache::MemoryCache;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Page {
        items: Vec<u32>,
    }

    fn service() -> CacheService {
        CacheService::new(Arc::new(MemoryCache::new(100)), Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_typed_set_get_del() {
        let svc = service();
        let page = Page { items: vec![1, 2] };

        svc.set("pins:x", &page, None).await.unwrap();
        assert_eq!(svc.get::<Page>("pins:x").await.unwrap(), Some(page));

        svc.del("pins:x").await.unwrap();
        assert_eq!(svc.get::<Page>("pins:x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_explicit_ttl_expires() {
        let svc = service();
        svc.set("pin:1", &1u32, Some(Duration::from_millis(50)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(svc.get::<u32>("pin:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mget_order_and_undecodable_slot() {
        let svc = service();
        svc.set("k1", &1u32, None).await.unwrap();
        svc.set_raw("k2", b"not json", None).await.unwrap();
        svc.set("k3", &3u32, None).await.unwrap();

        let keys = vec![
            "k1".to_string(),
            "k2".to_string(),
            "missing".to_string(),
            "k3".to_string(),
        ];
        let values = svc.mget::<u32>(&keys).await.unwrap();
        assert_eq!(values, vec![Some(1), None, None, Some(3)]);
    }

    #[tokio::test]
    async fn test_mset_then_mget() {
        let svc = service();
        let entries = vec![("a".to_string(), 10u32), ("b".to_string(), 20u32)];
        svc.mset(&entries, None).await.unwrap();

        let values = svc
            .mget::<u32>(&["b".to_string(), "a".to_string()])
            .await
            .unwrap();
        assert_eq!(values, vec![Some(20), Some(10)]);
    }

    #[tokio::test]
    async fn test_get_or_fetch_populates_then_hits() {
        let svc = service();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let page: std::result::Result<Page, String> = svc
                .get_or_fetch("pins:p1", None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Page { items: vec![7] })
                })
                .await;
            assert_eq!(page.unwrap().items, vec![7]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_does_not_cache_errors() {
        let svc = service();

        let result: std::result::Result<Page, &str> = svc
            .get_or_fetch("comments:missing:1:10", None, || async { Err("Pin not found") })
            .await;
        assert_eq!(result.unwrap_err(), "Pin not found");

        assert!(svc.get_raw("comments:missing:1:10").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_fetch_treats_garbage_as_miss() {
        let svc = service();
        svc.set_raw("pin:bad", b"{not json", None).await.unwrap();

        let value: std::result::Result<u32, String> =
            svc.get_or_fetch("pin:bad", None, || async { Ok(5) }).await;
        assert_eq!(value.unwrap(), 5);
        assert_eq!(svc.get::<u32>("pin:bad").await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_get_or_fetch_survives_unavailable_cache() {
        let svc = CacheService::new(Arc::new(FailingCache), Duration::from_secs(300));

        let value: std::result::Result<u32, String> =
            svc.get_or_fetch("pins:x", None, || async { Ok(42) }).await;
        assert_eq!(value.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_invalidate_keys_and_patterns() {
        let svc = service();
        svc.set("pin:1", &1u32, None).await.unwrap();
        svc.set("pins:{\"limit\":12,\"page\":1}", &1u32, None)
            .await
            .unwrap();
        svc.set("pins:{\"limit\":12,\"page\":2}", &2u32, None)
            .await
            .unwrap();
        svc.set("comments:p:1:10", &3u32, None).await.unwrap();

        svc.invalidate(&["pin:1".to_string()], &["pins:*".to_string()])
            .await;

        assert!(svc.get_raw("pin:1").await.unwrap().is_none());
        assert!(svc
            .get_raw("pins:{\"limit\":12,\"page\":1}")
            .await
            .unwrap()
            .is_none());
        assert!(svc
            .get_raw("pins:{\"limit\":12,\"page\":2}")
            .await
            .unwrap()
            .is_none());
        assert!(svc.get_raw("comments:p:1:10").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_swallows_failures() {
        let svc = CacheService::new(Arc::new(FailingCache), Duration::from_secs(300));
        // Must not panic or return an error
        svc.invalidate(&["pin:1".to_string()], &["pins:*".to_string()])
            .await;
    }
}
