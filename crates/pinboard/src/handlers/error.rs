//! Outermost error boundary for handlers.
//!
//! Client-facing failures (`DomainError`, and the `RepositoryError`
//! variants the client can act on) keep their message. Anything else is
//! logged and answered with a generic 500; the underlying error is only
//! echoed back when `DEV_MODE` is set.

use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use pinboard_core::domain::DomainError;
use pinboard_core::response::ErrorBody;
use pinboard_core::storage::{repository_error_to_status_code, RepositoryError};

const INTERNAL_MESSAGE: &str = "Something went wrong";

/// Whether 500 responses carry the underlying error text.
fn dev_mode() -> bool {
    static DEV_MODE: OnceLock<bool> = OnceLock::new();
    *DEV_MODE.get_or_init(|| std::env::var("DEV_MODE").is_ok())
}

/// Application error type that wraps `anyhow::Error`.
///
/// This allows using `?` on any error convertible into `anyhow::Error`.
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Status code and client message for this error.
    fn classify(&self) -> (StatusCode, Option<String>) {
        if let Some(domain_error) = self.0.downcast_ref::<DomainError>() {
            let status = StatusCode::from_u16(domain_error.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, Some(domain_error.to_string()));
        }

        if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            let code = repository_error_to_status_code(repo_error);
            let status =
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let message = match repo_error {
                RepositoryError::NotFound { entity_type, .. } => {
                    Some(format!("{entity_type} not found"))
                }
                RepositoryError::AlreadyExists { entity_type, .. } => {
                    Some(format!("{entity_type} already exists"))
                }
                RepositoryError::InvalidData(msg) => Some(msg.clone()),
                _ => None,
            };
            return (status, message);
        }

        (StatusCode::INTERNAL_SERVER_ERROR, None)
    }

    fn into_response_with(self, dev_mode: bool) -> Response {
        let (status, message) = self.classify();

        let body = match message {
            Some(message) if status.is_client_error() => {
                tracing::debug!(status = status.as_u16(), %message, "Request rejected");
                ErrorBody::new(status.as_u16(), message)
            }
            _ => {
                tracing::error!(error = %self.0, "Application error");
                let body = ErrorBody::new(status.as_u16(), INTERNAL_MESSAGE);
                if dev_mode {
                    body.with_detail(format!("{:#}", self.0))
                } else {
                    body
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_with(dev_mode())
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
