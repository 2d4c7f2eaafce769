//! Fixed-window rate-limit policy.

use std::time::Duration;

/// Message returned with every 429 response.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// At most `max` requests per subject in each `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max: u64,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub fn new(max: u64, window: Duration) -> Self {
        Self { max, window }
    }

    /// Whether the `count`-th request of the window must be rejected.
    pub fn is_exceeded(&self, count: u64) -> bool {
        count > self.max
    }
}

/// Picks the client address from an `x-forwarded-for` value: the first,
/// left-most hop.
pub fn first_forwarded_hop(header: &str) -> Option<&str> {
    header
        .split(',')
        .next()
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
}
