//! SQLite repository implementation.
//!
//! Implements the repository traits from `pinboard_core::storage` using SQLite.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use pinboard_core::domain::{Board, Comment, InteractionKind, Pin, User};
use pinboard_core::storage::{
    BoardRepository, CommentRepository, FollowRepository, InteractionRepository, PinRepository,
    RepositoryError, Result, UserRepository,
};

use super::conversions::{
    format_datetime, kind_to_string, row_to_board, row_to_comment, row_to_count, row_to_pin,
    row_to_user, tags_to_json,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Converts a page window to SQLite integers.
fn page_params(skip: u64, limit: u64) -> (i64, i64) {
    (
        i64::try_from(skip).unwrap_or(i64::MAX),
        i64::try_from(limit).unwrap_or(i64::MAX),
    )
}

/// SQLite-based repository implementation.
///
/// One serialized connection backs every repository trait.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens (or creates) a file-based database and applies the schema.
    ///
    /// `busy_timeout` bounds how long a statement waits on a locked database.
    pub async fn new(path: &str, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        conn.call(move |conn| conn.busy_timeout(busy_timeout).map_err(wrap_err))
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    /// Runs a `COUNT(*)` query bound to a single id.
    async fn count_by_id(&self, sql: &'static str, id: Uuid, entity: &'static str) -> Result<u64> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| conn.query_row(sql, [&id_str], row_to_count).map_err(wrap_err))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, entity))
    }
}

// ============================================================================
// UserRepository implementation
// ============================================================================

impl SqliteRepository {
    async fn find_user(&self, sql: &'static str, value: String) -> Result<Option<User>> {
        self.conn
            .call(move |conn| {
                conn.query_row(sql, [&value], row_to_user)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.find_user(schema::SELECT_USER_BY_ID, id.to_string()).await
    }

    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_USER_BY_ID).map_err(wrap_err)?;
                let mut users = Vec::with_capacity(ids.len());
                for id in &ids {
                    if let Some(user) = stmt.query_row([id], row_to_user).optional().map_err(wrap_err)? {
                        users.push(user);
                    }
                }
                Ok(users)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_user(schema::SELECT_USER_BY_USERNAME, username.to_string())
            .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_user(schema::SELECT_USER_BY_EMAIL, email.to_string())
            .await
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let id = user.id.to_string();
        let username = user.username.clone();
        let display_name = user.display_name.clone();
        let email = user.email.clone();
        let img = user.img.clone();
        let created_at = format_datetime(&user.created_at);

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_USER,
                    rusqlite::params![id, username, display_name, email, img, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }
}

// ============================================================================
// PinRepository implementation
// ============================================================================

#[async_trait]
impl PinRepository for SqliteRepository {
    async fn get_pin(&self, id: Uuid) -> Result<Option<Pin>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_PIN_BY_ID, [&id_str], row_to_pin)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Pin", id.to_string()))
    }

    async fn list_pins(&self, skip: u64, limit: u64) -> Result<Vec<Pin>> {
        let (offset, limit) = page_params(skip, limit);

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_PINS_PAGE).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(rusqlite::params![limit, offset], row_to_pin)
                    .map_err(wrap_err)?;

                let mut pins = Vec::new();
                for row_result in rows {
                    pins.push(row_result.map_err(wrap_err)?);
                }
                Ok(pins)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Pin"))
    }

    async fn count_pins(&self) -> Result<u64> {
        self.conn
            .call(|conn| {
                conn.query_row(schema::COUNT_PINS, [], row_to_count)
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Pin"))
    }

    async fn count_pins_by_user(&self, user_id: Uuid) -> Result<u64> {
        self.count_by_id(schema::COUNT_PINS_BY_USER, user_id, "Pin")
            .await
    }

    async fn count_pins_in_board(&self, board_id: Uuid) -> Result<u64> {
        self.count_by_id(schema::COUNT_PINS_IN_BOARD, board_id, "Pin")
            .await
    }

    async fn first_pin_in_board(&self, board_id: Uuid) -> Result<Option<Pin>> {
        let board_id_str = board_id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_FIRST_PIN_IN_BOARD, [&board_id_str], row_to_pin)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Pin"))
    }

    async fn create_pin(&self, pin: &Pin) -> Result<()> {
        let id = pin.id.to_string();
        let user_id = pin.user_id.to_string();
        let board_id = pin.board_id.map(|id| id.to_string());
        let title = pin.title.clone();
        let description = pin.description.clone();
        let link = pin.link.clone();
        let media = pin.media.clone();
        let width = pin.width;
        let height = pin.height;
        let tags = tags_to_json(&pin.tags)?;
        let created_at = format_datetime(&pin.created_at);
        let pin_id = pin.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_PIN,
                    rusqlite::params![
                        id,
                        user_id,
                        board_id,
                        title,
                        description,
                        link,
                        media,
                        width,
                        height,
                        tags,
                        created_at
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Pin", pin_id))
    }
}

// ============================================================================
// CommentRepository implementation
// ============================================================================

#[async_trait]
impl CommentRepository for SqliteRepository {
    async fn list_comments(&self, pin_id: Uuid, skip: u64, limit: u64) -> Result<Vec<Comment>> {
        let pin_id_str = pin_id.to_string();
        let (offset, limit) = page_params(skip, limit);

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_COMMENTS_PAGE)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map(rusqlite::params![pin_id_str, limit, offset], row_to_comment)
                    .map_err(wrap_err)?;

                let mut comments = Vec::new();
                for row_result in rows {
                    comments.push(row_result.map_err(wrap_err)?);
                }
                Ok(comments)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Comment"))
    }

    async fn count_comments(&self, pin_id: Uuid) -> Result<u64> {
        self.count_by_id(schema::COUNT_COMMENTS, pin_id, "Comment")
            .await
    }

    async fn create_comment(&self, comment: &Comment) -> Result<()> {
        let id = comment.id.to_string();
        let pin_id = comment.pin_id.to_string();
        let user_id = comment.user_id.to_string();
        let description = comment.description.clone();
        let created_at = format_datetime(&comment.created_at);
        let comment_id = comment.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_COMMENT,
                    rusqlite::params![id, pin_id, user_id, description, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Comment", comment_id))
    }
}

// ============================================================================
// BoardRepository implementation
// ============================================================================

#[async_trait]
impl BoardRepository for SqliteRepository {
    async fn get_board(&self, id: Uuid) -> Result<Option<Board>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_BOARD_BY_ID, [&id_str], row_to_board)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Board", id.to_string()))
    }

    async fn list_boards_by_user(&self, user_id: Uuid) -> Result<Vec<Board>> {
        let user_id_str = user_id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_BOARDS_BY_USER)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([&user_id_str], row_to_board)
                    .map_err(wrap_err)?;

                let mut boards = Vec::new();
                for row_result in rows {
                    boards.push(row_result.map_err(wrap_err)?);
                }
                Ok(boards)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Board"))
    }

    async fn create_board(&self, board: &Board) -> Result<()> {
        let id = board.id.to_string();
        let user_id = board.user_id.to_string();
        let title = board.title.clone();
        let description = board.description.clone();
        let is_private = board.is_private;
        let created_at = format_datetime(&board.created_at);
        let board_id = board.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_BOARD,
                    rusqlite::params![id, user_id, title, description, is_private, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Board", board_id))
    }
}

// ============================================================================
// InteractionRepository implementation
// ============================================================================

#[async_trait]
impl InteractionRepository for SqliteRepository {
    async fn has_interaction(
        &self,
        kind: InteractionKind,
        pin_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool> {
        let pin_id_str = pin_id.to_string();
        let user_id_str = user_id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(
                    schema::EXISTS_INTERACTION,
                    rusqlite::params![kind_to_string(kind), pin_id_str, user_id_str],
                    |row| row.get(0),
                )
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Interaction"))
    }

    async fn add_interaction(
        &self,
        kind: InteractionKind,
        pin_id: Uuid,
        user_id: Uuid,
    ) -> Result<()> {
        let pin_id_str = pin_id.to_string();
        let user_id_str = user_id.to_string();
        let created_at = format_datetime(&Utc::now());
        let interaction_id = format!("{}:{pin_id}:{user_id}", kind.as_str());

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_INTERACTION,
                    rusqlite::params![kind_to_string(kind), pin_id_str, user_id_str, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Interaction", interaction_id))
    }

    async fn remove_interaction(
        &self,
        kind: InteractionKind,
        pin_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool> {
        let pin_id_str = pin_id.to_string();
        let user_id_str = user_id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::DELETE_INTERACTION,
                        rusqlite::params![kind_to_string(kind), pin_id_str, user_id_str],
                    )
                    .map_err(wrap_err)?;
                Ok(rows > 0)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Interaction"))
    }

    async fn count_interactions(&self, kind: InteractionKind, pin_id: Uuid) -> Result<u64> {
        let pin_id_str = pin_id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(
                    schema::COUNT_INTERACTIONS,
                    rusqlite::params![kind_to_string(kind), pin_id_str],
                    row_to_count,
                )
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Interaction"))
    }
}

// ============================================================================
// FollowRepository implementation
// ============================================================================

#[async_trait]
impl FollowRepository for SqliteRepository {
    async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let follower = follower_id.to_string();
        let followee = followee_id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::EXISTS_FOLLOW, [&follower, &followee], |row| {
                    row.get(0)
                })
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Follow"))
    }

    async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<()> {
        let follower = follower_id.to_string();
        let followee = followee_id.to_string();
        let created_at = format_datetime(&Utc::now());
        let follow_id = format!("{follower_id}:{followee_id}");

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_FOLLOW,
                    rusqlite::params![follower, followee, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Follow", follow_id))
    }

    async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let follower = follower_id.to_string();
        let followee = followee_id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_FOLLOW, [&follower, &followee])
                    .map_err(wrap_err)?;
                Ok(rows > 0)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Follow"))
    }

    async fn count_followers(&self, user_id: Uuid) -> Result<u64> {
        self.count_by_id(schema::COUNT_FOLLOWERS, user_id, "Follow")
            .await
    }

    async fn count_following(&self, user_id: Uuid) -> Result<u64> {
        self.count_by_id(schema::COUNT_FOLLOWING, user_id, "Follow")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, minute, 0).unwrap()
    }

    fn user(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            display_name: format!("{username} display"),
            email: format!("{username}@example.com"),
            img: None,
            created_at: at(0),
        }
    }

    fn pin(user_id: Uuid, title: &str, created_at: DateTime<Utc>) -> Pin {
        Pin::new(
            user_id,
            title,
            "A description",
            "https://img.example.com/media/photo.jpg",
            640,
            480,
        )
        .with_tags(vec!["sky".to_string()])
        .with_created_at(created_at)
    }

    async fn repo_with_user() -> (SqliteRepository, User) {
        let repo = SqliteRepository::new_in_memory().await.unwrap();
        let alice = user("alice");
        repo.create_user(&alice).await.unwrap();
        (repo, alice)
    }

    #[tokio::test]
    async fn test_user_lookups() {
        let (repo, alice) = repo_with_user().await;

        assert_eq!(repo.get_user(alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(
            repo.get_user_by_username("alice").await.unwrap(),
            Some(alice.clone())
        );
        assert_eq!(
            repo.get_user_by_email("alice@example.com").await.unwrap(),
            Some(alice.clone())
        );
        assert_eq!(repo.get_user(Uuid::new_v4()).await.unwrap(), None);

        let users = repo.get_users(&[alice.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(users, vec![alice]);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_already_exists() {
        let (repo, _) = repo_with_user().await;
        let mut imposter = user("mallory");
        imposter.email = "alice@example.com".to_string();

        let result = repo.create_user(&imposter).await;

        assert!(matches!(
            result,
            Err(RepositoryError::AlreadyExists { entity_type: "User", .. })
        ));
    }

    #[tokio::test]
    async fn test_pins_round_trip_and_page_newest_first() {
        let (repo, alice) = repo_with_user().await;
        let oldest = pin(alice.id, "oldest", at(1));
        let middle = pin(alice.id, "middle", at(2));
        let newest = pin(alice.id, "newest", at(3));
        for p in [&middle, &oldest, &newest] {
            repo.create_pin(p).await.unwrap();
        }

        assert_eq!(repo.get_pin(oldest.id).await.unwrap(), Some(oldest.clone()));
        assert_eq!(repo.count_pins().await.unwrap(), 3);
        assert_eq!(repo.count_pins_by_user(alice.id).await.unwrap(), 3);

        let first_page = repo.list_pins(0, 2).await.unwrap();
        let titles: Vec<_> = first_page.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["newest", "middle"]);

        let second_page = repo.list_pins(2, 2).await.unwrap();
        assert_eq!(second_page, vec![oldest]);
    }

    #[tokio::test]
    async fn test_pin_with_unknown_author_is_invalid_data() {
        let repo = SqliteRepository::new_in_memory().await.unwrap();

        let result = repo.create_pin(&pin(Uuid::new_v4(), "orphan", at(1))).await;

        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_boards_and_first_pin() {
        let (repo, alice) = repo_with_user().await;
        let mut travel = Board::new(alice.id, "Travel").with_description("Places");
        travel.created_at = at(1);
        repo.create_board(&travel).await.unwrap();

        let first = pin(alice.id, "first", at(1)).with_board(travel.id);
        let second = pin(alice.id, "second", at(2)).with_board(travel.id);
        repo.create_pin(&second).await.unwrap();
        repo.create_pin(&first).await.unwrap();
        repo.create_pin(&pin(alice.id, "loose", at(3))).await.unwrap();

        assert_eq!(repo.get_board(travel.id).await.unwrap(), Some(travel.clone()));
        assert_eq!(repo.list_boards_by_user(alice.id).await.unwrap(), vec![travel.clone()]);
        assert_eq!(repo.count_pins_in_board(travel.id).await.unwrap(), 2);
        assert_eq!(repo.first_pin_in_board(travel.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_comments_page_newest_first() {
        let (repo, alice) = repo_with_user().await;
        let target = pin(alice.id, "target", at(1));
        repo.create_pin(&target).await.unwrap();

        let older = Comment::new(target.id, alice.id, "first!").with_created_at(at(2));
        let newer = Comment::new(target.id, alice.id, "second")
            .with_created_at(at(2) + ChronoDuration::seconds(1));
        repo.create_comment(&older).await.unwrap();
        repo.create_comment(&newer).await.unwrap();

        assert_eq!(repo.count_comments(target.id).await.unwrap(), 2);
        assert_eq!(
            repo.list_comments(target.id, 0, 10).await.unwrap(),
            vec![newer, older.clone()]
        );
        assert_eq!(repo.list_comments(target.id, 1, 10).await.unwrap(), vec![older]);
    }

    #[tokio::test]
    async fn test_interactions_are_unique() {
        let (repo, alice) = repo_with_user().await;
        let target = pin(alice.id, "target", at(1));
        repo.create_pin(&target).await.unwrap();

        repo.add_interaction(InteractionKind::Like, target.id, alice.id)
            .await
            .unwrap();
        let duplicate = repo
            .add_interaction(InteractionKind::Like, target.id, alice.id)
            .await;
        assert!(matches!(
            duplicate,
            Err(RepositoryError::AlreadyExists { entity_type: "Interaction", .. })
        ));

        assert!(repo
            .has_interaction(InteractionKind::Like, target.id, alice.id)
            .await
            .unwrap());
        assert!(!repo
            .has_interaction(InteractionKind::Save, target.id, alice.id)
            .await
            .unwrap());
        assert_eq!(
            repo.count_interactions(InteractionKind::Like, target.id)
                .await
                .unwrap(),
            1
        );

        assert!(repo
            .remove_interaction(InteractionKind::Like, target.id, alice.id)
            .await
            .unwrap());
        assert!(!repo
            .remove_interaction(InteractionKind::Like, target.id, alice.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_follow_edges() {
        let (repo, alice) = repo_with_user().await;
        let bob = user("bob");
        repo.create_user(&bob).await.unwrap();

        repo.follow(alice.id, bob.id).await.unwrap();

        assert!(repo.is_following(alice.id, bob.id).await.unwrap());
        assert!(!repo.is_following(bob.id, alice.id).await.unwrap());
        assert_eq!(repo.count_followers(bob.id).await.unwrap(), 1);
        assert_eq!(repo.count_following(alice.id).await.unwrap(), 1);
        assert!(matches!(
            repo.follow(alice.id, bob.id).await,
            Err(RepositoryError::AlreadyExists { .. })
        ));

        assert!(repo.unfollow(alice.id, bob.id).await.unwrap());
        assert!(!repo.unfollow(alice.id, bob.id).await.unwrap());
        assert_eq!(repo.count_followers(bob.id).await.unwrap(), 0);
    }
}
