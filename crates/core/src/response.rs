//! JSON response envelopes.
//!
//! Every body carries a machine-stable `status`: `success`, `fail` for
//! client errors (4xx) and `error` for server errors (5xx).

use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// The `status` field of every response body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
    Error,
}

impl ResponseStatus {
    /// Status for an error response with the given HTTP status code.
    pub fn for_error_code(code: u16) -> Self {
        if (400..500).contains(&code) {
            ResponseStatus::Fail
        } else {
            ResponseStatus::Error
        }
    }
}

/// Envelope of paginated listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub status: ResponseStatus,
    /// Number of items in this page.
    pub results: u64,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub data: Vec<T>,
}

impl<T> PageEnvelope<T> {
    /// Wraps one page of `data` out of `total` matching records.
    pub fn new(data: Vec<T>, total: u64, pagination: &Pagination) -> Self {
        Self {
            status: ResponseStatus::Success,
            results: data.len() as u64,
            total,
            total_pages: pagination.total_pages(total),
            current_page: pagination.page,
            data,
        }
    }
}

/// Envelope of single-resource and acknowledgement responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataEnvelope<T> {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data,
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: ResponseStatus,
    pub message: String,
    /// Internal error detail, only filled in development mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::for_error_code(code),
            message: message.into(),
            error: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.error = Some(detail.into());
        self
    }
}
