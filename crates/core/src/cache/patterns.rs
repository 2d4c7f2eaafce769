//! Glob-style matching of cache keys.
//!
//! Patterns support `*` as a wildcard matching any sequence of characters,
//! the subset of Redis `MATCH` syntax the invalidation paths rely on.

/// Checks if a cache key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use pinboard_core::cache::pattern_matches;
///
/// assert!(pattern_matches("pin:42", "pin:42"));
/// assert!(pattern_matches("comments:42:*", "comments:42:1:10"));
/// assert!(pattern_matches("interactions:*:7", "interactions:42:7"));
/// assert!(!pattern_matches("comments:42:*", "comments:43:1:10"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    if pattern.is_empty() {
        return key.is_empty();
    }

    if pattern == "*" {
        return true;
    }

    let segments: Vec<&str> = pattern.split('*').collect();

    // No wildcard at all
    if segments.len() == 1 {
        return pattern == key;
    }

    let mut remaining = key;
    let starts_with_wildcard = pattern.starts_with('*');
    let ends_with_wildcard = pattern.ends_with('*');

    for (i, segment) in segments.iter().enumerate() {
        // Leading, trailing and doubled `*` produce empty segments
        if segment.is_empty() {
            continue;
        }

        let is_first = i == 0;
        let is_last = i == segments.len() - 1;

        if is_first && !starts_with_wildcard {
            let Some(rest) = remaining.strip_prefix(segment) else {
                return false;
            };
            remaining = rest;
        } else if is_last && !ends_with_wildcard {
            return remaining.ends_with(segment);
        } else {
            match remaining.find(segment) {
                Some(pos) => remaining = &remaining[pos + segment.len()..],
                None => return false,
            }
        }
    }

    true
}
