//! Domain read and write paths.
//!
//! Read paths go through [`CacheService::get_or_fetch`]: build the key,
//! serve a hit, otherwise query the store, shape the response and populate
//! the cache. Write paths mutate the store first and then drop every cache
//! entry that could now be stale with [`CacheService::invalidate`].
//!
//! [`CacheService::get_or_fetch`]: crate::cache::CacheService::get_or_fetch
//! [`CacheService::invalidate`]: crate::cache::CacheService::invalidate

pub mod boards;
pub mod comments;
pub mod images;
pub mod interactions;
pub mod pins;
pub mod users;

use std::collections::HashMap;

use uuid::Uuid;

use pinboard_core::domain::{DomainError, Pin, UserSummary};

use crate::state::AppState;

/// Loads the public summaries of the given authors, keyed by user id.
async fn author_summaries(
    state: &AppState,
    ids: impl IntoIterator<Item = Uuid>,
) -> anyhow::Result<HashMap<Uuid, UserSummary>> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let users = state.users.get_users(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u.summary())).collect())
}

/// Fetches a pin or fails with `Pin not found`.
async fn require_pin(state: &AppState, pin_id: Uuid) -> anyhow::Result<Pin> {
    state
        .pins
        .get_pin(pin_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Pin").into())
}
