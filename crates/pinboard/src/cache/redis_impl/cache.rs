//! Redis cache implementation.
//!
//! Pattern deletion walks the keyspace with `SCAN MATCH` in batches and
//! deletes each batch, so it never blocks the server the way `KEYS` does.
//! Keys created while a scan is running may survive it; invalidation is
//! best-effort and entries still expire by TTL.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;

use pinboard_core::cache::{Cache, Result};

use super::error::map_redis_error;

/// Keys requested from the server per `SCAN` iteration.
const SCAN_BATCH: usize = 100;

/// Redis cache backend using connection manager for reconnects.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Creates a new Redis cache connection.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `connect_timeout` - Deadline for establishing the connection
    /// * `response_timeout` - Deadline for every command
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(
        url: &str,
        connect_timeout: Duration,
        response_timeout: Duration,
    ) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(connect_timeout)
            .set_response_timeout(response_timeout);
        let conn = ConnectionManager::new_with_config(client, config)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

/// Redis expiries are whole seconds; sub-second TTLs round up to one.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => {
                conn.set_ex::<_, _, ()>(key, value, ttl_seconds(duration))
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;

            if !keys.is_empty() {
                conn.del::<_, ()>(&keys).await.map_err(map_redis_error)?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        // Explicit MGET: a one-key batch must still come back as an array.
        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(values)
    }

    async fn mset(&self, entries: &[(String, Vec<u8>)], ttl: Option<Duration>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in entries {
            match ttl {
                Some(duration) => pipe.set_ex(key, value, ttl_seconds(duration)).ignore(),
                None => pipe.set(key, value).ignore(),
            };
        }

        let mut conn = self.conn.clone();
        let _: () = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn increment(&self, key: &str, window: Duration) -> Result<u64> {
        // INCR and EXPIRE NX run as one transaction: the first hit of the
        // window starts the expiry clock, and a counter left without a TTL
        // gets one on its next hit.
        let seconds = i64::try_from(ttl_seconds(window)).unwrap_or(i64::MAX);
        let mut pipe = redis::pipe();
        pipe.atomic()
            .incr(key, 1u64)
            .cmd("EXPIRE")
            .arg(key)
            .arg(seconds)
            .arg("NX")
            .ignore();

        let mut conn = self.conn.clone();
        let (count,): (u64,) = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    /// Helper to get Redis URL from environment.
    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Skip test if Redis not available.
    async fn get_test_cache() -> Option<RedisCache> {
        RedisCache::new(
            &redis_url(),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .await
        .ok()
    }

    /// Generate a unique test key to avoid conflicts.
    fn test_key(suffix: &str) -> String {
        format!("test:redis_cache:{}:{}", Uuid::new_v4(), suffix)
    }

    #[test]
    fn test_ttl_seconds_rounds_up_to_one() {
        assert_eq!(ttl_seconds(Duration::from_millis(10)), 1);
        assert_eq!(ttl_seconds(Duration::from_secs(300)), 300);
    }

    #[tokio::test]
    async fn test_redis_set_and_get() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("set_get");
        let value = b"hello world";

        cache.set(&key, value, None).await.unwrap();

        let result = cache.get(&key).await.unwrap();
        assert_eq!(result, Some(value.to_vec()));

        // Clean up
        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_get_nonexistent() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("nonexistent");
        let result = cache.get(&key).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_redis_ttl() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("ttl");

        cache
            .set(&key, b"expiring value", Some(Duration::from_secs(1)))
            .await
            .unwrap();

        assert!(cache.get(&key).await.unwrap().is_some());

        // Wait for expiration
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_delete_pattern() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let prefix = test_key("comments");
        let key1 = format!("{prefix}:1:10");
        let key2 = format!("{prefix}:2:10");
        let other = test_key("other");

        cache.set(&key1, b"value1", None).await.unwrap();
        cache.set(&key2, b"value2", None).await.unwrap();
        cache.set(&other, b"value3", None).await.unwrap();

        cache.delete_pattern(&format!("{prefix}:*")).await.unwrap();

        assert!(cache.get(&key1).await.unwrap().is_none());
        assert!(cache.get(&key2).await.unwrap().is_none());
        assert!(cache.get(&other).await.unwrap().is_some());

        // Clean up
        cache.delete(&other).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_mget_and_mset() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let k1 = test_key("k1");
        let k2 = test_key("k2");
        let k3 = test_key("k3");

        cache
            .mset(
                &[(k1.clone(), b"v1".to_vec()), (k3.clone(), b"v3".to_vec())],
                Some(Duration::from_secs(30)),
            )
            .await
            .unwrap();

        let values = cache
            .mget(&[k1.clone(), k2.clone(), k3.clone()])
            .await
            .unwrap();
        assert_eq!(
            values,
            vec![Some(b"v1".to_vec()), None, Some(b"v3".to_vec())]
        );

        let single = cache.mget(std::slice::from_ref(&k1)).await.unwrap();
        assert_eq!(single, vec![Some(b"v1".to_vec())]);

        cache.delete(&k1).await.unwrap();
        cache.delete(&k3).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_increment() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("counter");
        let window = Duration::from_secs(1);

        assert_eq!(cache.increment(&key, window).await.unwrap(), 1);
        assert_eq!(cache.increment(&key, window).await.unwrap(), 2);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.increment(&key, window).await.unwrap(), 1);

        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_increment_gives_a_counter_without_ttl_a_window() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("stuck-counter");
        cache.set(&key, b"7", None).await.unwrap();

        assert_eq!(cache.increment(&key, Duration::from_secs(60)).await.unwrap(), 8);

        let ttl: i64 = cache.conn.clone().ttl(&key).await.unwrap();
        assert!(ttl > 0 && ttl <= 60, "ttl = {ttl}");

        cache.delete(&key).await.unwrap();
    }
}
