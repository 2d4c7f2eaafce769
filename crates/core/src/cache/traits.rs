use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Port to the key-value cache store.
///
/// Values are opaque bytes. Typed access and JSON encoding live one layer up,
/// in the server's cache service.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes all values matching a glob pattern (e.g., "comments:<pin>:*").
    ///
    /// Deleting a pattern that matches nothing is not an error.
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;

    /// Gets several values at once. The result has one slot per key, in the
    /// same order as `keys`.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    /// Sets several values sharing one TTL.
    ///
    /// Backends that can should do this in a single round trip.
    async fn mset(&self, entries: &[(String, Vec<u8>)], ttl: Option<Duration>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value, ttl).await?;
        }
        Ok(())
    }

    /// Increments a fixed-window counter and returns the new count.
    ///
    /// The window starts with the first increment of a key; once `window`
    /// has elapsed the counter starts again from 1.
    async fn increment(&self, key: &str, window: Duration) -> Result<u64>;
}
