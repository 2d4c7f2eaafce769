//! Pin handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use pinboard_core::domain::{
    CreatePinRequest, InteractionKind, InteractionStatus, PinView, ToggleOutcome,
};
use pinboard_core::pagination::{PageQuery, Pagination, PINS_DEFAULT_LIMIT};
use pinboard_core::response::{DataEnvelope, PageEnvelope};

use tracing::Instrument;

use super::{json_body, parse_id, AppError};
use crate::context::{CurrentUser, RequestContext};
use crate::services::{interactions, pins};
use crate::state::AppState;

/// GET /api/v1/pins - one page of the feed.
pub async fn list_pins(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageEnvelope<PinView>>, AppError> {
    let pagination = Pagination::from_query(&query, PINS_DEFAULT_LIMIT);
    Ok(Json(pins::list_pins(&state, pagination).await?))
}

/// GET /api/v1/pins/{id}
pub async fn get_pin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<PinView>>, AppError> {
    let pin_id = parse_id(&id, "Pin")?;
    let pin = pins::get_pin(&state, pin_id).await?;
    Ok(Json(DataEnvelope::success(pin)))
}

/// POST /api/v1/pins
pub async fn create_pin(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    body: Result<Json<CreatePinRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataEnvelope<PinView>>), AppError> {
    let request = json_body(body)?;
    let pin = pins::create_pin(&state, &user, request).await?;
    Ok((StatusCode::CREATED, Json(DataEnvelope::success(pin))))
}

async fn toggle(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
    kind: InteractionKind,
) -> Result<Json<DataEnvelope<ToggleOutcome>>, AppError> {
    let pin_id = parse_id(id, "Pin")?;
    let outcome = interactions::toggle(state, &user.0, pin_id, kind).await?;
    Ok(Json(DataEnvelope::with_message(
        outcome,
        kind.toggle_message(outcome.active),
    )))
}

/// POST /api/v1/pins/{id}/like
pub async fn like_pin(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<ToggleOutcome>>, AppError> {
    toggle(&state, &user, &id, InteractionKind::Like).await
}

/// POST /api/v1/pins/{id}/save
pub async fn save_pin(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<ToggleOutcome>>, AppError> {
    toggle(&state, &user, &id, InteractionKind::Save).await
}

/// GET /api/v1/pins/interaction-check/{id}
pub async fn interaction_check(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<InteractionStatus>>, AppError> {
    let pin_id = parse_id(&id, "Pin")?;
    let span = tracing::debug_span!("interaction_check", request_id = %ctx.request_id, %pin_id);
    let status = interactions::check(&state, ctx.user_id(), pin_id)
        .instrument(span)
        .await?;
    Ok(Json(DataEnvelope::success(status)))
}
