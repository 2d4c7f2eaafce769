//! Pagination parsing and math for listing endpoints.
//!
//! Parsing is lenient: a missing, malformed, zero or negative `page` or
//! `limit` falls back to the default instead of failing the request.

use serde::Deserialize;

use crate::serde::deserialize_positive_int;

/// Default page size of the pin feed.
pub const PINS_DEFAULT_LIMIT: u64 = 12;

/// Default page size of a pin's comment list.
pub const COMMENTS_DEFAULT_LIMIT: u64 = 10;

/// Largest accepted page size; bigger requests are clamped.
pub const MAX_LIMIT: u64 = 100;

/// Raw `?page=&limit=` query parameters.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_positive_int")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_positive_int")]
    pub limit: Option<u64>,
}

/// Effective pagination after defaults are applied. Both fields are >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    /// Builds the effective pagination from raw query values.
    pub fn from_query(query: &PageQuery, default_limit: u64) -> Self {
        let default_limit = default_limit.clamp(1, MAX_LIMIT);
        Self {
            page: query.page.filter(|p| *p > 0).unwrap_or(1),
            limit: query
                .limit
                .filter(|l| *l > 0)
                .map(|l| l.min(MAX_LIMIT))
                .unwrap_or(default_limit),
        }
    }

    /// Number of records to skip before the requested page.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Total number of pages for `total` matching records.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}
