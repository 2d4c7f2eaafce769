//! Image variant registry.
//!
//! Variant descriptors live only in the cache: they are written when a pin
//! is created and expire with the image TTL.

use pinboard_core::cache::image_variant_key;
use pinboard_core::domain::{
    file_id_from_media, DomainError, ImageVariant, ImageVariantInfo, Pin,
};

use crate::state::AppState;

/// Stores the descriptor of every variant of the pin's media in one batch.
///
/// Failures are logged; a pin without registered variants is still valid.
pub async fn register_variants(state: &AppState, pin: &Pin) {
    let Some(file_id) = file_id_from_media(&pin.media) else {
        tracing::debug!(pin_id = %pin.id, "Media URL has no file id, skipping variants");
        return;
    };

    let variants =
        match ImageVariantInfo::resolve_all(&file_id, &pin.media, Some((pin.width, pin.height))) {
            Ok(variants) => variants,
            Err(err) => {
                tracing::warn!(pin_id = %pin.id, error = %err, "Failed to resolve image variants");
                return;
            }
        };

    let entries: Vec<(String, ImageVariantInfo)> = variants
        .into_iter()
        .map(|info| (image_variant_key(&file_id, info.variant.as_str()), info))
        .collect();

    if let Err(err) = state
        .cache
        .mset(&entries, Some(state.config.image_cache_ttl()))
        .await
    {
        tracing::warn!(%file_id, error = %err, "Failed to register image variants");
    }
}

/// Looks up one registered variant.
pub async fn get_variant(
    state: &AppState,
    file_id: &str,
    variant: ImageVariant,
) -> anyhow::Result<ImageVariantInfo> {
    let key = image_variant_key(file_id, variant.as_str());

    let cached = match state.cache.get::<ImageVariantInfo>(&key).await {
        Ok(cached) => cached,
        Err(err) => {
            tracing::warn!(%key, error = %err, "Cache read failed for image variant");
            None
        }
    };

    cached.ok_or_else(|| DomainError::NotFound("Image").into())
}

/// Every registered variant of an image, in `ImageVariant::ALL` order.
///
/// Read with one batch lookup; fails with `Image not found` when none is
/// registered.
pub async fn list_variants(state: &AppState, file_id: &str) -> anyhow::Result<Vec<ImageVariantInfo>> {
    let keys: Vec<String> = ImageVariant::ALL
        .iter()
        .map(|variant| image_variant_key(file_id, variant.as_str()))
        .collect();

    let found = match state.cache.mget::<ImageVariantInfo>(&keys).await {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(%file_id, error = %err, "Cache batch read failed for image variants");
            Vec::new()
        }
    };

    let variants: Vec<ImageVariantInfo> = found.into_iter().flatten().collect();
    if variants.is_empty() {
        return Err(DomainError::NotFound("Image").into());
    }
    Ok(variants)
}
