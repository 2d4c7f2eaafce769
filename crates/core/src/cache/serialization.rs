//! JSON encoding of cache values.
//!
//! Cached values are stored as JSON so entries stay readable with
//! `redis-cli` and can be shared with any other reader of the same keys.

use serde::{de::DeserializeOwned, Serialize};

use super::CacheError;

/// Serializes a value to JSON bytes for the cache.
pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CacheError> {
    serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Deserializes cache bytes produced by [`serialize`].
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CacheError> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization(e.to_string()))
}
