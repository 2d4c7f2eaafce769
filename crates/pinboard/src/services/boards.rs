//! Boards of a user.
//!
//! Listings are cached whole by the response cache in front of the route;
//! creating a board drops the owner's cached listings.

use futures_util::future::try_join_all;
use uuid::Uuid;

use pinboard_core::cache::user_boards_response_pattern;
use pinboard_core::domain::{Board, BoardWithPins, CreateBoardRequest, DomainError, User};

use crate::state::AppState;

/// A user's boards, oldest first, each with its pin count and cover pin.
pub async fn list_user_boards(
    state: &AppState,
    user_id: Uuid,
) -> anyhow::Result<Vec<BoardWithPins>> {
    if state.users.get_user(user_id).await?.is_none() {
        return Err(DomainError::NotFound("User").into());
    }

    let boards = state.boards.list_boards_by_user(user_id).await?;

    let detailed = try_join_all(boards.into_iter().map(move |board| async move {
        let (pin_count, first_pin) = tokio::try_join!(
            state.pins.count_pins_in_board(board.id),
            state.pins.first_pin_in_board(board.id),
        )?;
        Ok::<_, anyhow::Error>(BoardWithPins {
            board,
            pin_count,
            first_pin,
        })
    }))
    .await?;

    Ok(detailed)
}

/// Creates a board owned by `user`.
pub async fn create_board(
    state: &AppState,
    user: &User,
    request: CreateBoardRequest,
) -> anyhow::Result<Board> {
    let board = request.validate(user.id)?;

    state.boards.create_board(&board).await?;
    tracing::debug!(board_id = %board.id, user_id = %user.id, "Board created");

    state
        .cache
        .invalidate(&[], &[user_boards_response_pattern(user.id)])
        .await;

    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pinboard_core::domain::Pin;

    #[tokio::test]
    async fn test_boards_carry_count_and_oldest_pin() {
        let state = AppState::default();
        let erin = User::new("erin", "Erin E", "erin@example.com");
        state.users.create_user(&erin).await.unwrap();

        let board = create_board(
            &state,
            &erin,
            CreateBoardRequest {
                title: Some("Kitchens".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let empty = create_board(
            &state,
            &erin,
            CreateBoardRequest {
                title: Some("Later".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let now = Utc::now();
        let older = Pin::new(erin.id, "Old", "d", "https://img.example.com/a.jpg", 1, 1)
            .with_board(board.id)
            .with_created_at(now - Duration::minutes(5));
        let newer = Pin::new(erin.id, "New", "d", "https://img.example.com/b.jpg", 1, 1)
            .with_board(board.id)
            .with_created_at(now);
        state.pins.create_pin(&newer).await.unwrap();
        state.pins.create_pin(&older).await.unwrap();

        let boards = list_user_boards(&state, erin.id).await.unwrap();

        assert_eq!(boards.len(), 2);
        let kitchens = boards.iter().find(|b| b.board.id == board.id).unwrap();
        assert_eq!(kitchens.pin_count, 2);
        assert_eq!(kitchens.first_pin.as_ref().map(|p| p.id), Some(older.id));
        let later = boards.iter().find(|b| b.board.id == empty.id).unwrap();
        assert_eq!(later.pin_count, 0);
        assert_eq!(later.first_pin, None);
    }

    #[tokio::test]
    async fn test_boards_of_unknown_user() {
        let state = AppState::default();

        let err = list_user_boards(&state, Uuid::new_v4()).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::NotFound("User"))
        );
    }

    #[tokio::test]
    async fn test_create_board_validates_title() {
        let state = AppState::default();
        let erin = User::new("erin", "Erin E", "erin@example.com");

        let err = create_board(&state, &erin, CreateBoardRequest::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::validation("Board title is required"))
        );
    }
}
