use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Board, Comment, InteractionKind, Pin, User};

use super::Result;

/// Repository for user operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets every user whose ID is in `ids`. Unknown IDs are skipped.
    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    /// Gets a user by their username.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Gets a user by their email address.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Creates a new user. Fails with `AlreadyExists` on a taken username or email.
    async fn create_user(&self, user: &User) -> Result<()>;
}

/// Repository for pin operations.
#[async_trait]
pub trait PinRepository: Send + Sync {
    /// Gets a pin by its ID.
    async fn get_pin(&self, id: Uuid) -> Result<Option<Pin>>;

    /// Lists pins newest first.
    async fn list_pins(&self, skip: u64, limit: u64) -> Result<Vec<Pin>>;

    /// Counts every pin.
    async fn count_pins(&self) -> Result<u64>;

    /// Counts the pins created by a user.
    async fn count_pins_by_user(&self, user_id: Uuid) -> Result<u64>;

    /// Counts the pins filed in a board.
    async fn count_pins_in_board(&self, board_id: Uuid) -> Result<u64>;

    /// Gets the oldest pin filed in a board.
    async fn first_pin_in_board(&self, board_id: Uuid) -> Result<Option<Pin>>;

    /// Creates a new pin.
    async fn create_pin(&self, pin: &Pin) -> Result<()>;
}

/// Repository for comment operations.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Lists the comments on a pin, newest first.
    async fn list_comments(&self, pin_id: Uuid, skip: u64, limit: u64) -> Result<Vec<Comment>>;

    /// Counts the comments on a pin.
    async fn count_comments(&self, pin_id: Uuid) -> Result<u64>;

    /// Creates a new comment.
    async fn create_comment(&self, comment: &Comment) -> Result<()>;
}

/// Repository for board operations.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Gets a board by its ID.
    async fn get_board(&self, id: Uuid) -> Result<Option<Board>>;

    /// Lists a user's boards, oldest first.
    async fn list_boards_by_user(&self, user_id: Uuid) -> Result<Vec<Board>>;

    /// Creates a new board.
    async fn create_board(&self, board: &Board) -> Result<()>;
}

/// Repository for the like and save relations between users and pins.
///
/// A `(kind, pin, user)` triple exists at most once.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Checks whether the user holds the relation on the pin.
    async fn has_interaction(&self, kind: InteractionKind, pin_id: Uuid, user_id: Uuid)
        -> Result<bool>;

    /// Records the relation. Fails with `AlreadyExists` if it is already held.
    async fn add_interaction(&self, kind: InteractionKind, pin_id: Uuid, user_id: Uuid)
        -> Result<()>;

    /// Removes the relation, returning whether it was held.
    async fn remove_interaction(
        &self,
        kind: InteractionKind,
        pin_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool>;

    /// Counts the users holding the relation on the pin.
    async fn count_interactions(&self, kind: InteractionKind, pin_id: Uuid) -> Result<u64>;
}

/// Repository for follow edges between users.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Checks whether `follower_id` follows `followee_id`.
    async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool>;

    /// Records the edge. Fails with `AlreadyExists` if it already exists.
    async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<()>;

    /// Removes the edge, returning whether it existed.
    async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool>;

    /// Counts the followers of a user.
    async fn count_followers(&self, user_id: Uuid) -> Result<u64>;

    /// Counts the users a user follows.
    async fn count_following(&self, user_id: Uuid) -> Result<u64>;
}
