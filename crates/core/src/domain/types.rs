//! Domain entities and their API-facing views.
//!
//! Records (`User`, `Pin`, `Comment`, `Board`) mirror what the store keeps.
//! Views (`PinView`, `CommentView`, `BoardWithPins`, ...) are the explicit
//! response shapes the read paths build and cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            display_name: display_name.into(),
            email: email.into(),
            img: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_img(mut self, img: impl Into<String>) -> Self {
        self.img = Some(img.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// The public subset of the user embedded in pins and comments.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            img: self.img.clone(),
        }
    }
}

/// Public author information joined into pins and comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

/// A user's public profile with social counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
    pub pin_count: u64,
    /// Whether the requesting user follows this user (false when anonymous).
    pub is_following: bool,
    pub created_at: DateTime<Utc>,
}

/// An image pinned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub board_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub link: Option<String>,
    /// URL of the image.
    pub media: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Pin {
    pub fn new(
        user_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
        media: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            board_id: None,
            title: title.into(),
            description: description.into(),
            link: None,
            media: media.into(),
            width,
            height,
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_board(mut self, board_id: Uuid) -> Self {
        self.board_id = Some(board_id);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// A pin as returned by the API, with its author joined in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PinView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub link: Option<String>,
    pub media: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub board: Option<Uuid>,
    /// `None` when the author record no longer exists.
    pub user: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

impl PinView {
    pub fn new(pin: Pin, user: Option<UserSummary>) -> Self {
        Self {
            id: pin.id,
            title: pin.title,
            description: pin.description,
            link: pin.link,
            media: pin.media,
            width: pin.width,
            height: pin.height,
            tags: pin.tags,
            board: pin.board_id,
            user,
            created_at: pin.created_at,
        }
    }
}

/// A comment left on a pin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub pin_id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(pin_id: Uuid, user_id: Uuid, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pin_id,
            user_id,
            description: description.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// A comment as returned by the API, with its author joined in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub pin: Uuid,
    pub description: String,
    pub user: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(comment: Comment, user: Option<UserSummary>) -> Self {
        Self {
            id: comment.id,
            pin: comment.pin_id,
            description: comment.description,
            user,
            created_at: comment.created_at,
        }
    }
}

/// A named collection of pins owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn new(user_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: None,
            is_private: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }
}

/// A board with the count of its pins and a cover pin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoardWithPins {
    #[serde(flatten)]
    pub board: Board,
    pub pin_count: u64,
    /// Oldest pin of the board, used as its cover.
    pub first_pin: Option<Pin>,
}

/// The two toggleable user-pin relations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Save,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Save => "save",
        }
    }

    /// Acknowledgement message after a toggle left the relation `active`.
    pub fn toggle_message(&self, active: bool) -> &'static str {
        match (self, active) {
            (InteractionKind::Like, true) => "Pin liked",
            (InteractionKind::Like, false) => "Like removed",
            (InteractionKind::Save, true) => "Pin saved",
            (InteractionKind::Save, false) => "Save removed",
        }
    }
}

/// Result of a like/save toggle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    /// Whether the relation exists after the toggle.
    pub active: bool,
    /// Number of users holding the relation on the pin after the toggle.
    pub count: u64,
}

/// A user's relation to a pin, as returned by the interaction check.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionStatus {
    pub is_liked: bool,
    pub is_saved: bool,
    pub like_count: u64,
}

/// Result of a follow toggle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FollowOutcome {
    pub following: bool,
    pub follower_count: u64,
}

impl FollowOutcome {
    pub fn message(&self) -> &'static str {
        if self.following {
            "User followed successfully"
        } else {
            "User unfollowed successfully"
        }
    }
}
