//! Like and save toggles, and the per-user interaction check.

use uuid::Uuid;

use pinboard_core::cache::{interactions_key, interactions_pattern};
use pinboard_core::domain::{InteractionKind, InteractionStatus, ToggleOutcome, User};
use pinboard_core::storage::RepositoryError;

use super::require_pin;
use crate::state::AppState;

/// Flips the `kind` relation between `user` and the pin.
///
/// The store keeps each relation at most once. A toggle racing another
/// toggle of the same relation reports what the store now holds: a failed
/// insert (`AlreadyExists`) leaves it active, a remove that found nothing
/// leaves it inactive.
pub async fn toggle(
    state: &AppState,
    user: &User,
    pin_id: Uuid,
    kind: InteractionKind,
) -> anyhow::Result<ToggleOutcome> {
    require_pin(state, pin_id).await?;

    let repo = &state.interactions;
    let active = if repo.has_interaction(kind, pin_id, user.id).await? {
        if !repo.remove_interaction(kind, pin_id, user.id).await? {
            tracing::debug!(%pin_id, user_id = %user.id, kind = kind.as_str(), "Interaction already removed");
        }
        false
    } else {
        match repo.add_interaction(kind, pin_id, user.id).await {
            Ok(()) | Err(RepositoryError::AlreadyExists { .. }) => true,
            Err(err) => return Err(err.into()),
        }
    };

    let count = repo.count_interactions(kind, pin_id).await?;
    tracing::debug!(%pin_id, user_id = %user.id, kind = kind.as_str(), active, "Interaction toggled");

    state
        .cache
        .invalidate(&[], &[interactions_pattern(pin_id)])
        .await;

    Ok(ToggleOutcome { active, count })
}

/// Whether the acting user liked and saved the pin, plus its like count.
///
/// Anonymous callers get the all-false status without touching the cache
/// or the store.
pub async fn check(
    state: &AppState,
    user_id: Option<Uuid>,
    pin_id: Uuid,
) -> anyhow::Result<InteractionStatus> {
    let Some(user_id) = user_id else {
        return Ok(InteractionStatus::default());
    };

    let key = interactions_key(pin_id, user_id);
    let ttl = state.config.cache_ttl();

    state
        .cache
        .get_or_fetch(&key, Some(ttl), move || async move {
            let repo = &state.interactions;
            let (is_liked, is_saved, like_count) = tokio::try_join!(
                repo.has_interaction(InteractionKind::Like, pin_id, user_id),
                repo.has_interaction(InteractionKind::Save, pin_id, user_id),
                repo.count_interactions(InteractionKind::Like, pin_id),
            )?;

            Ok::<_, anyhow::Error>(InteractionStatus {
                is_liked,
                is_saved,
                like_count,
            })
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use pinboard_core::domain::{DomainError, Pin};
    use pinboard_core::storage::{InteractionRepository, Result};

    async fn seeded() -> (AppState, User, Pin) {
        let state = AppState::default();
        let user = User::new("dave", "Dave D", "dave@example.com");
        state.users.create_user(&user).await.unwrap();
        let pin = Pin::new(user.id, "Pin", "d", "https://img.example.com/p.jpg", 10, 10);
        state.pins.create_pin(&pin).await.unwrap();
        (state, user, pin)
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let (state, user, pin) = seeded().await;

        let liked = toggle(&state, &user, pin.id, InteractionKind::Like)
            .await
            .unwrap();
        assert_eq!(liked, ToggleOutcome { active: true, count: 1 });

        let unliked = toggle(&state, &user, pin.id, InteractionKind::Like)
            .await
            .unwrap();
        assert_eq!(unliked, ToggleOutcome { active: false, count: 0 });
    }

    #[tokio::test]
    async fn test_toggle_invalidates_cached_check() {
        let (state, user, pin) = seeded().await;

        let before = check(&state, Some(user.id), pin.id).await.unwrap();
        assert!(!before.is_saved);

        toggle(&state, &user, pin.id, InteractionKind::Save)
            .await
            .unwrap();

        let after = check(&state, Some(user.id), pin.id).await.unwrap();
        assert!(after.is_saved);
        assert!(!after.is_liked);
        assert_eq!(after.like_count, 0);
    }

    #[tokio::test]
    async fn test_anonymous_check_skips_cache() {
        let (state, user, pin) = seeded().await;
        toggle(&state, &user, pin.id, InteractionKind::Like)
            .await
            .unwrap();

        let status = check(&state, None, pin.id).await.unwrap();

        assert_eq!(status, InteractionStatus::default());
    }

    #[tokio::test]
    async fn test_toggle_on_missing_pin() {
        let (state, user, _) = seeded().await;

        let err = toggle(&state, &user, Uuid::new_v4(), InteractionKind::Like)
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::NotFound("Pin"))
        );
    }

    /// Reports the relation as held, but another toggle removes it first.
    struct RemovedConcurrently;

    #[async_trait]
    impl InteractionRepository for RemovedConcurrently {
        async fn has_interaction(&self, _: InteractionKind, _: Uuid, _: Uuid) -> Result<bool> {
            Ok(true)
        }

        async fn add_interaction(&self, _: InteractionKind, _: Uuid, _: Uuid) -> Result<()> {
            Ok(())
        }

        async fn remove_interaction(&self, _: InteractionKind, _: Uuid, _: Uuid) -> Result<bool> {
            Ok(false)
        }

        async fn count_interactions(&self, _: InteractionKind, _: Uuid) -> Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_remove_lost_to_concurrent_toggle_is_inactive() {
        let (mut state, user, pin) = seeded().await;
        state.interactions = Arc::new(RemovedConcurrently);

        let outcome = toggle(&state, &user, pin.id, InteractionKind::Like)
            .await
            .unwrap();

        assert_eq!(outcome, ToggleOutcome { active: false, count: 0 });
    }

    #[tokio::test]
    async fn test_duplicate_insert_counts_as_active() {
        let (state, user, pin) = seeded().await;
        state
            .interactions
            .add_interaction(InteractionKind::Like, pin.id, user.id)
            .await
            .unwrap();

        let result = state
            .interactions
            .add_interaction(InteractionKind::Like, pin.id, user.id)
            .await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));

        let status = check(&state, Some(user.id), pin.id).await.unwrap();
        assert!(status.is_liked);
        assert_eq!(status.like_count, 1);
    }
}
