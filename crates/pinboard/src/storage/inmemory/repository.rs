//! In-memory repository implementation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use pinboard_core::domain::{Board, Comment, InteractionKind, Pin, User};
use pinboard_core::storage::{
    BoardRepository, CommentRepository, FollowRepository, InteractionRepository, PinRepository,
    RepositoryError, Result, UserRepository,
};

/// In-memory storage backend.
///
/// Pins and comments are kept in insertion order so that records sharing a
/// timestamp still list newest first. Likes, saves and follows are sets, so
/// a relation can only be recorded once.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    pins: Arc<RwLock<Vec<Pin>>>,
    comments: Arc<RwLock<Vec<Comment>>>,
    boards: Arc<RwLock<HashMap<Uuid, Board>>>,
    interactions: Arc<RwLock<HashSet<(InteractionKind, Uuid, Uuid)>>>,
    follows: Arc<RwLock<HashSet<(Uuid, Uuid)>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            pins: Arc::new(RwLock::new(Vec::new())),
            comments: Arc::new(RwLock::new(Vec::new())),
            boards: Arc::new(RwLock::new(HashMap::new())),
            interactions: Arc::new(RwLock::new(HashSet::new())),
            follows: Arc::new(RwLock::new(HashSet::new())),
        }
    }
}

/// Newest first; among equal timestamps the later insert wins.
fn newest_first<'a, T, F>(items: impl DoubleEndedIterator<Item = &'a T>, created_at: F) -> Vec<&'a T>
where
    T: 'a,
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    let mut sorted: Vec<&T> = items.rev().collect();
    sorted.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    sorted
}

fn page<T: Clone>(items: Vec<&T>, skip: u64, limit: u64) -> Vec<T> {
    items
        .into_iter()
        .skip(usize::try_from(skip).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        let taken = users.contains_key(&user.id)
            || users
                .values()
                .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.username.clone(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl PinRepository for InMemoryRepository {
    async fn get_pin(&self, id: Uuid) -> Result<Option<Pin>> {
        let pins = self.pins.read().await;
        Ok(pins.iter().find(|p| p.id == id).cloned())
    }

    async fn list_pins(&self, skip: u64, limit: u64) -> Result<Vec<Pin>> {
        let pins = self.pins.read().await;
        Ok(page(newest_first(pins.iter(), |p| p.created_at), skip, limit))
    }

    async fn count_pins(&self) -> Result<u64> {
        let pins = self.pins.read().await;
        Ok(pins.len() as u64)
    }

    async fn count_pins_by_user(&self, user_id: Uuid) -> Result<u64> {
        let pins = self.pins.read().await;
        Ok(pins.iter().filter(|p| p.user_id == user_id).count() as u64)
    }

    async fn count_pins_in_board(&self, board_id: Uuid) -> Result<u64> {
        let pins = self.pins.read().await;
        Ok(pins.iter().filter(|p| p.board_id == Some(board_id)).count() as u64)
    }

    async fn first_pin_in_board(&self, board_id: Uuid) -> Result<Option<Pin>> {
        let pins = self.pins.read().await;
        Ok(pins
            .iter()
            .filter(|p| p.board_id == Some(board_id))
            .min_by_key(|p| p.created_at)
            .cloned())
    }

    async fn create_pin(&self, pin: &Pin) -> Result<()> {
        let mut pins = self.pins.write().await;
        if pins.iter().any(|p| p.id == pin.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Pin",
                id: pin.id.to_string(),
            });
        }
        pins.push(pin.clone());
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryRepository {
    async fn list_comments(&self, pin_id: Uuid, skip: u64, limit: u64) -> Result<Vec<Comment>> {
        let comments = self.comments.read().await;
        let on_pin = comments.iter().filter(|c| c.pin_id == pin_id);
        Ok(page(newest_first(on_pin, |c| c.created_at), skip, limit))
    }

    async fn count_comments(&self, pin_id: Uuid) -> Result<u64> {
        let comments = self.comments.read().await;
        Ok(comments.iter().filter(|c| c.pin_id == pin_id).count() as u64)
    }

    async fn create_comment(&self, comment: &Comment) -> Result<()> {
        let mut comments = self.comments.write().await;
        if comments.iter().any(|c| c.id == comment.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Comment",
                id: comment.id.to_string(),
            });
        }
        comments.push(comment.clone());
        Ok(())
    }
}

#[async_trait]
impl BoardRepository for InMemoryRepository {
    async fn get_board(&self, id: Uuid) -> Result<Option<Board>> {
        let boards = self.boards.read().await;
        Ok(boards.get(&id).cloned())
    }

    async fn list_boards_by_user(&self, user_id: Uuid) -> Result<Vec<Board>> {
        let boards = self.boards.read().await;
        let mut owned: Vec<Board> = boards
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn create_board(&self, board: &Board) -> Result<()> {
        let mut boards = self.boards.write().await;
        if boards.contains_key(&board.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Board",
                id: board.id.to_string(),
            });
        }
        boards.insert(board.id, board.clone());
        Ok(())
    }
}

#[async_trait]
impl InteractionRepository for InMemoryRepository {
    async fn has_interaction(
        &self,
        kind: InteractionKind,
        pin_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool> {
        let interactions = self.interactions.read().await;
        Ok(interactions.contains(&(kind, pin_id, user_id)))
    }

    async fn add_interaction(
        &self,
        kind: InteractionKind,
        pin_id: Uuid,
        user_id: Uuid,
    ) -> Result<()> {
        let mut interactions = self.interactions.write().await;
        if !interactions.insert((kind, pin_id, user_id)) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Interaction",
                id: format!("{}:{pin_id}:{user_id}", kind.as_str()),
            });
        }
        Ok(())
    }

    async fn remove_interaction(
        &self,
        kind: InteractionKind,
        pin_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool> {
        let mut interactions = self.interactions.write().await;
        Ok(interactions.remove(&(kind, pin_id, user_id)))
    }

    async fn count_interactions(&self, kind: InteractionKind, pin_id: Uuid) -> Result<u64> {
        let interactions = self.interactions.read().await;
        Ok(interactions
            .iter()
            .filter(|(k, p, _)| *k == kind && *p == pin_id)
            .count() as u64)
    }
}

#[async_trait]
impl FollowRepository for InMemoryRepository {
    async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let follows = self.follows.read().await;
        Ok(follows.contains(&(follower_id, followee_id)))
    }

    async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<()> {
        let mut follows = self.follows.write().await;
        if !follows.insert((follower_id, followee_id)) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Follow",
                id: format!("{follower_id}:{followee_id}"),
            });
        }
        Ok(())
    }

    async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let mut follows = self.follows.write().await;
        Ok(follows.remove(&(follower_id, followee_id)))
    }

    async fn count_followers(&self, user_id: Uuid) -> Result<u64> {
        let follows = self.follows.read().await;
        Ok(follows.iter().filter(|(_, f)| *f == user_id).count() as u64)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<u64> {
        let follows = self.follows.read().await;
        Ok(follows.iter().filter(|(f, _)| *f == user_id).count() as u64)
    }
}
