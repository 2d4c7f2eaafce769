//! Axum extractors for `RequestContext` and `CurrentUser`.
//!
//! The acting user is named by the `x-user-id` header, which carries the
//! UUID of an existing user. Credential checks happen upstream.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use pinboard_core::domain::{DomainError, User};

use super::types::{CurrentUser, RequestContext, RequestId};
use crate::handlers::AppError;
use crate::state::AppState;

/// Header naming the acting user.
pub const USER_ID_HEADER: &str = "x-user-id";

fn extract_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(RequestId::from_uuid)
        .unwrap_or_else(RequestId::new)
}

/// Parses the acting user's ID from the request headers.
pub fn user_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
}

async fn load_user(state: &AppState, headers: &HeaderMap) -> Result<Option<User>, AppError> {
    let Some(user_id) = user_id_from_headers(headers) else {
        return Ok(None);
    };
    Ok(state.users.get_user(user_id).await?)
}

impl<S> FromRequestParts<S> for RequestContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let request_id = extract_request_id(&parts.headers);

        let user = match load_user(&app_state, &parts.headers).await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(%request_id, error = %err.0, "Failed to load acting user");
                None
            }
        };

        Ok(RequestContext { user, request_id })
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        load_user(&app_state, &parts.headers)
            .await?
            .map(CurrentUser)
            .ok_or_else(|| DomainError::Unauthorized.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_extract_request_id_from_header() {
        let mut headers = HeaderMap::new();
        let id = "550e8400-e29b-41d4-a716-446655440000";
        headers.insert("x-request-id", id.parse().unwrap());

        let request_id = extract_request_id(&headers);
        assert_eq!(request_id.to_string(), id);
    }

    #[test]
    fn test_extract_request_id_generates_when_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "not-a-uuid".parse().unwrap());

        let request_id = extract_request_id(&headers);

        Uuid::parse_str(&request_id.to_string()).expect("Should be valid UUID");
    }

    #[test]
    fn test_user_id_from_headers() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        assert_eq!(user_id_from_headers(&headers), None);

        headers.insert(USER_ID_HEADER, "garbage".parse().unwrap());
        assert_eq!(user_id_from_headers(&headers), None);

        headers.insert(USER_ID_HEADER, id.to_string().parse().unwrap());
        assert_eq!(user_id_from_headers(&headers), Some(id));
    }

    fn parts_with_user(user_id: Option<Uuid>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(id) = user_id {
            builder = builder.header(USER_ID_HEADER, id.to_string());
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_request_context_resolves_known_user() {
        let state = AppState::default();
        let user = User::new("ada", "Ada Lovelace", "ada@example.com");
        state.users.create_user(&user).await.unwrap();

        let mut parts = parts_with_user(Some(user.id));
        let ctx = RequestContext::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(ctx.user_id(), Some(user.id));
    }

    #[tokio::test]
    async fn test_request_context_unknown_user_is_anonymous() {
        let state = AppState::default();
        let mut parts = parts_with_user(Some(Uuid::new_v4()));
        let ctx = RequestContext::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(ctx.user.is_none());
    }

    #[tokio::test]
    async fn test_current_user_rejects_anonymous() {
        let state = AppState::default();
        let mut parts = parts_with_user(None);
        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        let err = result.unwrap_err();
        assert!(matches!(
            err.0.downcast_ref::<DomainError>(),
            Some(DomainError::Unauthorized)
        ));
    }
}
