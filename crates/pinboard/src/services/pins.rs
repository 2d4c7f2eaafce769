//! Pin feed, single pin and pin creation.

use uuid::Uuid;

use pinboard_core::cache::{pin_key, pins_key, pins_pattern, user_boards_response_pattern};
use pinboard_core::domain::{CreatePinRequest, DomainError, PinView, User};
use pinboard_core::pagination::Pagination;
use pinboard_core::response::PageEnvelope;

use super::{author_summaries, images, require_pin};
use crate::state::AppState;

/// One page of the feed, newest first, with authors joined in.
pub async fn list_pins(
    state: &AppState,
    pagination: Pagination,
) -> anyhow::Result<PageEnvelope<PinView>> {
    let key = pins_key(&pagination);
    let ttl = state.config.cache_ttl();

    state
        .cache
        .get_or_fetch(&key, Some(ttl), move || async move {
            let (pins, total) = tokio::try_join!(
                state.pins.list_pins(pagination.skip(), pagination.limit),
                state.pins.count_pins(),
            )?;

            let authors = author_summaries(state, pins.iter().map(|p| p.user_id)).await?;
            let views = pins
                .into_iter()
                .map(|pin| {
                    let user = authors.get(&pin.user_id).cloned();
                    PinView::new(pin, user)
                })
                .collect();

            Ok::<_, anyhow::Error>(PageEnvelope::new(views, total, &pagination))
        })
        .await
}

/// A single pin with its author.
pub async fn get_pin(state: &AppState, pin_id: Uuid) -> anyhow::Result<PinView> {
    let ttl = state.config.pin_cache_ttl();

    state
        .cache
        .get_or_fetch(&pin_key(pin_id), Some(ttl), move || async move {
            let pin = require_pin(state, pin_id).await?;
            let author = state.users.get_user(pin.user_id).await?;
            Ok::<_, anyhow::Error>(PinView::new(pin, author.map(|u| u.summary())))
        })
        .await
}

/// Creates a pin owned by `user`.
///
/// A board, when given, must exist and belong to the user. The feed pages
/// (and the owner's board listings when a board is set) are invalidated,
/// and the image variants of the media are registered.
pub async fn create_pin(
    state: &AppState,
    user: &User,
    request: CreatePinRequest,
) -> anyhow::Result<PinView> {
    let pin = request.validate(user.id)?;

    if let Some(board_id) = pin.board_id {
        let board = state
            .boards
            .get_board(board_id)
            .await?
            .ok_or(DomainError::NotFound("Board"))?;
        if board.user_id != user.id {
            return Err(DomainError::Forbidden(
                "You can only add pins to your own boards".to_string(),
            )
            .into());
        }
    }

    state.pins.create_pin(&pin).await?;
    tracing::info!(pin_id = %pin.id, user_id = %user.id, "Pin created");

    let mut patterns = vec![pins_pattern()];
    if pin.board_id.is_some() {
        patterns.push(user_boards_response_pattern(user.id));
    }
    state.cache.invalidate(&[], &patterns).await;

    images::register_variants(state, &pin).await;

    Ok(PinView::new(pin, Some(user.summary())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinboard_core::domain::{Board, Pin};
    use pinboard_core::pagination::PINS_DEFAULT_LIMIT;

    async fn user(state: &AppState, username: &str) -> User {
        let user = User::new(username, format!("{username} display"), format!("{username}@example.com"));
        state.users.create_user(&user).await.unwrap();
        user
    }

    fn request(title: &str) -> CreatePinRequest {
        CreatePinRequest {
            title: Some(title.to_string()),
            description: Some("A description".to_string()),
            media: Some("https://img.example.com/media/photo.jpg".to_string()),
            width: Some(1000),
            height: Some(500),
            ..Default::default()
        }
    }

    fn first_page() -> Pagination {
        Pagination {
            page: 1,
            limit: PINS_DEFAULT_LIMIT,
        }
    }

    #[tokio::test]
    async fn test_list_pins_joins_authors_and_caches() {
        let state = AppState::default();
        let alice = user(&state, "alice").await;
        create_pin(&state, &alice, request("Sunset")).await.unwrap();

        let page = list_pins(&state, first_page()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].user, Some(alice.summary()));

        let cached: Option<PageEnvelope<PinView>> =
            state.cache.get(&pins_key(&first_page())).await.unwrap();
        assert_eq!(cached, Some(page));
    }

    #[tokio::test]
    async fn test_create_pin_invalidates_feed() {
        let state = AppState::default();
        let alice = user(&state, "alice").await;

        let before = list_pins(&state, first_page()).await.unwrap();
        assert_eq!(before.total, 0);

        create_pin(&state, &alice, request("Sunset")).await.unwrap();

        let after = list_pins(&state, first_page()).await.unwrap();
        assert_eq!(after.total, 1);
        assert_eq!(after.data[0].title, "Sunset");
    }

    #[tokio::test]
    async fn test_get_pin_missing_is_not_found_and_not_cached() {
        let state = AppState::default();
        let id = Uuid::new_v4();

        let err = get_pin(&state, id).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::NotFound("Pin"))
        );
        assert_eq!(state.cache.get_raw(&pin_key(id)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_pin_is_served_from_cache() {
        let state = AppState::default();
        let alice = user(&state, "alice").await;
        let pin = Pin::new(alice.id, "Cached", "d", "https://img.example.com/a.jpg", 10, 10);
        state.pins.create_pin(&pin).await.unwrap();

        let first = get_pin(&state, pin.id).await.unwrap();
        assert_eq!(first.user, Some(alice.summary()));

        let stored: Option<PinView> = state.cache.get(&pin_key(pin.id)).await.unwrap();
        assert_eq!(stored, Some(first));
    }

    #[tokio::test]
    async fn test_create_pin_on_foreign_board_is_forbidden() {
        let state = AppState::default();
        let alice = user(&state, "alice").await;
        let bob = user(&state, "bob").await;
        let board = Board::new(bob.id, "Bob's");
        state.boards.create_board(&board).await.unwrap();

        let mut req = request("Sneaky");
        req.board = Some(board.id.to_string());
        let err = create_pin(&state, &alice, req).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Forbidden(_))
        ));
        assert_eq!(state.pins.count_pins().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_pin_on_missing_board_is_not_found() {
        let state = AppState::default();
        let alice = user(&state, "alice").await;

        let mut req = request("Lost");
        req.board = Some(Uuid::new_v4().to_string());
        let err = create_pin(&state, &alice, req).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::NotFound("Board"))
        );
    }

    #[tokio::test]
    async fn test_create_pin_rejects_invalid_payload() {
        let state = AppState::default();
        let alice = user(&state, "alice").await;

        let mut req = request("No size");
        req.width = None;
        let err = create_pin(&state, &alice, req).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::validation(
                "Width and height must be positive integers"
            ))
        );
    }
}
