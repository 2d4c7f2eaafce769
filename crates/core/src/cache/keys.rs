//! Cache key builders.
//!
//! Keys are `:`-delimited: resource prefix, identifying path parameters,
//! then the effective pagination. Two requests with the same effective query
//! shape build the same key; requests differing in page or limit do not.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::pagination::Pagination;

/// Returns the cache key for a page of the pin feed.
///
/// The query part is a JSON object with sorted keys built from the
/// *effective* pagination, so `?page=1` and `?limit=12` share one entry.
///
/// ```
/// use pinboard_core::cache::pins_key;
/// use pinboard_core::pagination::Pagination;
///
/// let key = pins_key(&Pagination { page: 2, limit: 12 });
/// assert_eq!(key, r#"pins:{"limit":12,"page":2}"#);
/// ```
pub fn pins_key(pagination: &Pagination) -> String {
    let query: BTreeMap<&str, u64> =
        BTreeMap::from([("limit", pagination.limit), ("page", pagination.page)]);
    // A map of integers always serializes.
    let json = serde_json::to_string(&query).unwrap_or_default();
    format!("pins:{json}")
}

/// Returns the pattern matching every cached page of the pin feed.
pub fn pins_pattern() -> String {
    "pins:*".to_string()
}

/// Returns the cache key for a single pin.
pub fn pin_key(pin_id: Uuid) -> String {
    format!("pin:{pin_id}")
}

/// Returns the cache key for a page of comments on a pin.
pub fn comments_key(pin_id: Uuid, pagination: &Pagination) -> String {
    format!(
        "comments:{}:{}:{}",
        pin_id, pagination.page, pagination.limit
    )
}

/// Returns the pattern matching every cached comment page of a pin.
pub fn comments_pattern(pin_id: Uuid) -> String {
    format!("comments:{pin_id}:*")
}

/// Returns the cache key for a user's interaction status on a pin.
pub fn interactions_key(pin_id: Uuid, user_id: Uuid) -> String {
    format!("interactions:{pin_id}:{user_id}")
}

/// Returns the pattern matching every cached interaction status of a pin.
pub fn interactions_pattern(pin_id: Uuid) -> String {
    format!("interactions:{pin_id}:*")
}

/// Returns the cache key for one image variant.
pub fn image_variant_key(file_id: &str, variant: &str) -> String {
    format!("image:{file_id}:{variant}")
}

/// Returns the pattern matching every cached variant of an image.
pub fn image_variants_pattern(file_id: &str) -> String {
    format!("image:{file_id}:*")
}

/// Returns the key for a whole cached HTTP response.
///
/// `path_and_query` is the full request target, e.g. `/api/v1/boards/user/42?x=1`.
pub fn response_key(prefix: &str, path_and_query: &str) -> String {
    format!("{prefix}:{path_and_query}")
}

/// Prefix used by the response cache on the user boards endpoint.
pub const BOARDS_RESPONSE_PREFIX: &str = "boards";

/// Returns the pattern matching every cached boards response of a user,
/// whatever query string was used.
pub fn user_boards_response_pattern(user_id: Uuid) -> String {
    format!("{BOARDS_RESPONSE_PREFIX}:/api/v1/boards/user/{user_id}*")
}

/// Returns the counter key for a rate-limit scope and subject (IP or user).
pub fn rate_limit_key(scope: &str, subject: &str) -> String {
    format!("ratelimit:{scope}:{subject}")
}
