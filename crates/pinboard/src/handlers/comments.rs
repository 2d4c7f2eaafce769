//! Comment handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use pinboard_core::domain::{CommentView, CreateCommentRequest};
use pinboard_core::pagination::{PageQuery, Pagination, COMMENTS_DEFAULT_LIMIT};
use pinboard_core::response::{DataEnvelope, PageEnvelope};

use super::{json_body, parse_id, AppError};
use crate::context::CurrentUser;
use crate::services::comments;
use crate::state::AppState;

/// GET /api/v1/comments/pin/{pin_id}
pub async fn list_comments(
    State(state): State<AppState>,
    Path(pin_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageEnvelope<CommentView>>, AppError> {
    let pin_id = parse_id(&pin_id, "Pin")?;
    let pagination = Pagination::from_query(&query, COMMENTS_DEFAULT_LIMIT);
    Ok(Json(
        comments::list_comments(&state, pin_id, pagination).await?,
    ))
}

/// POST /api/v1/comments/pin/{pin_id}
pub async fn add_comment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(pin_id): Path<String>,
    body: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataEnvelope<CommentView>>), AppError> {
    let request = json_body(body)?;
    let pin_id = parse_id(&pin_id, "Pin")?;
    let comment = comments::add_comment(&state, &user, pin_id, request).await?;
    Ok((StatusCode::CREATED, Json(DataEnvelope::success(comment))))
}
