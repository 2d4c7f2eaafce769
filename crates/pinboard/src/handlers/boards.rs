//! Board handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use pinboard_core::domain::{Board, BoardWithPins, CreateBoardRequest};
use pinboard_core::response::DataEnvelope;

use super::{json_body, parse_id, AppError};
use crate::context::CurrentUser;
use crate::services::boards;
use crate::state::AppState;

/// GET /api/v1/boards/user/{user_id}
///
/// Served through the response cache layered on the route.
pub async fn list_user_boards(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DataEnvelope<Vec<BoardWithPins>>>, AppError> {
    let user_id = parse_id(&user_id, "User")?;
    let boards = boards::list_user_boards(&state, user_id).await?;
    Ok(Json(DataEnvelope::success(boards)))
}

/// POST /api/v1/boards
pub async fn create_board(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    body: Result<Json<CreateBoardRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataEnvelope<Board>>), AppError> {
    let request = json_body(body)?;
    let board = boards::create_board(&state, &user, request).await?;
    Ok((StatusCode::CREATED, Json(DataEnvelope::success(board))))
}
