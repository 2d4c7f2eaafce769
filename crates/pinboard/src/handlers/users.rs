//! User handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use pinboard_core::domain::{FollowOutcome, RegisterUserRequest, User, UserProfile};
use pinboard_core::response::DataEnvelope;
use tracing::Instrument;

use super::{json_body, AppError};
use crate::context::{CurrentUser, RequestContext};
use crate::services::users;
use crate::state::AppState;

/// POST /api/v1/users/register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataEnvelope<User>>), AppError> {
    let request = json_body(body)?;
    let user = users::register(&state, request).await?;
    Ok((StatusCode::CREATED, Json(DataEnvelope::success(user))))
}

/// GET /api/v1/users/{username}
pub async fn profile(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DataEnvelope<UserProfile>>, AppError> {
    let span = tracing::debug_span!("profile", request_id = %ctx.request_id, %username);
    let profile = users::profile(&state, &username, ctx.user_id())
        .instrument(span)
        .await?;
    Ok(Json(DataEnvelope::success(profile)))
}

/// POST /api/v1/users/{username}/follow
pub async fn follow(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DataEnvelope<FollowOutcome>>, AppError> {
    let outcome = users::toggle_follow(&state, &user, &username).await?;
    Ok(Json(DataEnvelope::with_message(outcome, outcome.message())))
}
