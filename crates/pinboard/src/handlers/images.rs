//! Image variant handlers.

use axum::{
    extract::{Path, State},
    Json,
};

use pinboard_core::domain::{ImageVariant, ImageVariantInfo};
use pinboard_core::response::DataEnvelope;

use super::AppError;
use crate::services::images;
use crate::state::AppState;

/// GET /api/v1/images/{file_id}
pub async fn list_variants(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<DataEnvelope<Vec<ImageVariantInfo>>>, AppError> {
    let variants = images::list_variants(&state, &file_id).await?;
    Ok(Json(DataEnvelope::success(variants)))
}

/// GET /api/v1/images/{file_id}/{variant}
pub async fn get_variant(
    State(state): State<AppState>,
    Path((file_id, variant)): Path<(String, String)>,
) -> Result<Json<DataEnvelope<ImageVariantInfo>>, AppError> {
    let variant: ImageVariant = variant.parse()?;
    let info = images::get_variant(&state, &file_id, variant).await?;
    Ok(Json(DataEnvelope::success(info)))
}
