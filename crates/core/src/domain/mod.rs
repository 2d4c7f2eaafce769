//! Pinboard domain: entities, request validation, image variants and
//! rate-limit policy.

mod error;
mod images;
mod rate_limit;
mod requests;
mod types;

pub use error::DomainError;
pub use images::{file_id_from_media, ImageVariant, ImageVariantInfo};
pub use rate_limit::{first_forwarded_hop, RateLimitPolicy, RATE_LIMIT_MESSAGE};
pub use requests::{
    CreateBoardRequest, CreateCommentRequest, CreatePinRequest, RegisterUserRequest,
    COMMENT_MAX_CHARS,
};
pub use types::{
    Board, BoardWithPins, Comment, CommentView, FollowOutcome, InteractionKind,
    InteractionStatus, Pin, PinView, ToggleOutcome, User, UserProfile, UserSummary,
};
