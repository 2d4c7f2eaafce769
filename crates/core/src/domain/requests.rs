//! API request payloads and their validation.
//!
//! Each payload deserializes leniently and exposes a `validate` method that
//! either returns the normalized value or a `DomainError::Validation` whose
//! message is shown to the client unchanged.

use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::error::DomainError;
use super::types::{Board, Comment, Pin, User};
use crate::serde::{deserialize_optional_string, deserialize_tags};

/// Maximum length of a comment, in characters.
pub const COMMENT_MAX_CHARS: usize = 500;

/// Request payload for commenting on a pin.
///
/// The text arrives as `description`; `text` is accepted as an alias.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default, alias = "text")]
    pub description: Option<String>,
}

impl CreateCommentRequest {
    /// Validates the text and builds the comment, trimmed.
    pub fn validate(self, pin_id: Uuid, user_id: Uuid) -> Result<Comment, DomainError> {
        let text = self.description.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(DomainError::validation("Comment text is required"));
        }
        if text.chars().count() > COMMENT_MAX_CHARS {
            return Err(DomainError::validation(
                "Comment cannot exceed 500 characters",
            ));
        }
        Ok(Comment::new(pin_id, user_id, text.trim()))
    }
}

/// Request payload for creating a pin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    /// Image URL. `imageUrl` is accepted as an alias.
    #[serde(default, alias = "imageUrl", deserialize_with = "deserialize_optional_string")]
    pub media: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub board: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

impl CreatePinRequest {
    /// Validates the payload and builds the pin owned by `user_id`.
    pub fn validate(self, user_id: Uuid) -> Result<Pin, DomainError> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .ok_or_else(|| DomainError::validation("Title is required"))?;
        if title.chars().count() > 100 {
            return Err(DomainError::validation(
                "Title cannot exceed 100 characters",
            ));
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .ok_or_else(|| DomainError::validation("Description is required"))?;
        if description.chars().count() > 500 {
            return Err(DomainError::validation(
                "Description cannot exceed 500 characters",
            ));
        }

        let media = self
            .media
            .ok_or_else(|| DomainError::validation("Please provide an image URL"))?;
        let media = parse_web_url(&media)
            .ok_or_else(|| DomainError::validation("Image URL must be a valid http(s) URL"))?;

        let (width, height) = match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(DomainError::validation(
                    "Width and height must be positive integers",
                ))
            }
        };

        let mut pin = Pin::new(user_id, title, description, media, width, height).with_tags(self.tags);

        if let Some(link) = self.link {
            let link = parse_web_url(&link)
                .ok_or_else(|| DomainError::validation("Link must be a valid URL"))?;
            pin = pin.with_link(link);
        }

        if let Some(board) = self.board {
            let board_id = Uuid::parse_str(board.trim())
                .map_err(|_| DomainError::validation("Invalid board id"))?;
            pin = pin.with_board(board_id);
        }

        Ok(pin)
    }
}

/// Request payload for creating a board.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

impl CreateBoardRequest {
    pub fn validate(self, user_id: Uuid) -> Result<Board, DomainError> {
        let title = self.title.unwrap_or_default().trim().to_string();
        match title.chars().count() {
            0 => return Err(DomainError::validation("Board title is required")),
            n if n > 50 => {
                return Err(DomainError::validation(
                    "Board title cannot exceed 50 characters",
                ))
            }
            _ => {}
        }

        let mut board = Board::new(user_id, title).with_private(self.is_private);
        if let Some(description) = self.description {
            if description.chars().count() > 500 {
                return Err(DomainError::validation(
                    "Board description cannot exceed 500 characters",
                ));
            }
            board = board.with_description(description.trim());
        }
        Ok(board)
    }
}

/// Request payload for registering a user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub img: Option<String>,
}

impl RegisterUserRequest {
    pub fn validate(self) -> Result<User, DomainError> {
        let username = self.username.unwrap_or_default().trim().to_string();
        let username_len = username.chars().count();
        if !(3..=30).contains(&username_len) {
            return Err(DomainError::validation(
                "Username must be between 3 and 30 characters",
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DomainError::validation(
                "Username may only contain letters, numbers and underscores",
            ));
        }

        let display_name = self.display_name.unwrap_or_default().trim().to_string();
        if !(3..=50).contains(&display_name.chars().count()) {
            return Err(DomainError::validation(
                "Display name must be between 3 and 50 characters",
            ));
        }

        let email = self.email.unwrap_or_default().trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(DomainError::validation("Please provide a valid email"));
        }

        let mut user = User::new(username, display_name, email);
        if let Some(img) = self.img {
            let img = parse_web_url(&img)
                .ok_or_else(|| DomainError::validation("Avatar must be a valid URL"))?;
            user = user.with_img(img);
        }
        Ok(user)
    }
}

/// Parses an absolute http(s) URL, returning its normalized form.
fn parse_web_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url.to_string()),
        _ => None,
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
