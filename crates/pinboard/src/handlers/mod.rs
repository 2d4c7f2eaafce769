//! HTTP handlers.
//!
//! Handlers only extract, call into `crate::services` and wrap the result in
//! a response envelope. Every failure goes through [`AppError`].

pub mod boards;
pub mod comments;
pub mod error;
pub mod health;
pub mod images;
pub mod pins;
pub mod users;

use axum::{extract::rejection::JsonRejection, Json};
use uuid::Uuid;

use pinboard_core::domain::DomainError;

pub use error::AppError;

/// Unwraps a JSON body, answering a malformed one with a 400 envelope.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        AppError::from(DomainError::validation(rejection.body_text()))
    })
}

/// Parses an id path segment. Only the canonical lowercase hyphenated form
/// names a record, so each record has exactly one URL and one response
/// cache key; any other text reads as `<entity> not found`.
fn parse_id(raw: &str, entity: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .ok()
        .filter(|id| id.to_string() == raw)
        .ok_or_else(|| AppError::from(DomainError::NotFound(entity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_only_canonical_form() {
        let id = Uuid::new_v4();

        assert_eq!(parse_id(&id.to_string(), "Pin").ok(), Some(id));

        let aliases = [
            id.to_string().to_uppercase(),
            id.simple().to_string(),
            id.braced().to_string(),
            id.urn().to_string(),
            "not-a-uuid".to_string(),
        ];
        for alias in aliases {
            let err = parse_id(&alias, "Pin").unwrap_err();
            assert_eq!(
                err.0.downcast_ref::<DomainError>(),
                Some(&DomainError::NotFound("Pin")),
                "{alias}"
            );
        }
    }
}
