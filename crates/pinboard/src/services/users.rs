//! Registration, public profiles and follow toggles.

use uuid::Uuid;

use pinboard_core::domain::{
    DomainError, FollowOutcome, RegisterUserRequest, User, UserProfile,
};
use pinboard_core::storage::RepositoryError;

use crate::state::AppState;

/// Registers a new user.
///
/// Email and username must be free; the store enforces the same rule, so a
/// registration racing this check still fails with a conflict.
pub async fn register(state: &AppState, request: RegisterUserRequest) -> anyhow::Result<User> {
    let user = request.validate()?;

    if state.users.get_user_by_email(&user.email).await?.is_some() {
        return Err(DomainError::Conflict("Email already registered".to_string()).into());
    }
    if state
        .users
        .get_user_by_username(&user.username)
        .await?
        .is_some()
    {
        return Err(DomainError::Conflict("Username already taken".to_string()).into());
    }

    match state.users.create_user(&user).await {
        Ok(()) => {}
        Err(RepositoryError::AlreadyExists { .. }) => {
            return Err(
                DomainError::Conflict("Username or email already registered".to_string()).into(),
            )
        }
        Err(err) => return Err(err.into()),
    }

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(user)
}

async fn require_user(state: &AppState, username: &str) -> anyhow::Result<User> {
    state
        .users
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| DomainError::NotFound("User").into())
}

/// Public profile of `username` as seen by `viewer`.
pub async fn profile(
    state: &AppState,
    username: &str,
    viewer: Option<Uuid>,
) -> anyhow::Result<UserProfile> {
    let user = require_user(state, username).await?;

    let is_following = async {
        match viewer {
            Some(viewer) => state.follows.is_following(viewer, user.id).await,
            None => Ok(false),
        }
    };
    let (follower_count, following_count, pin_count, is_following) = tokio::try_join!(
        state.follows.count_followers(user.id),
        state.follows.count_following(user.id),
        state.pins.count_pins_by_user(user.id),
        is_following,
    )?;

    Ok(UserProfile {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        img: user.img,
        follower_count,
        following_count,
        pin_count,
        is_following,
        created_at: user.created_at,
    })
}

/// Follows `username` if `follower` does not follow them yet, else unfollows.
pub async fn toggle_follow(
    state: &AppState,
    follower: &User,
    username: &str,
) -> anyhow::Result<FollowOutcome> {
    let followee = require_user(state, username).await?;
    if followee.id == follower.id {
        return Err(DomainError::validation("You cannot follow yourself").into());
    }

    // Racing toggles resolve to what the store holds afterwards.
    let following = if state.follows.is_following(follower.id, followee.id).await? {
        if !state.follows.unfollow(follower.id, followee.id).await? {
            tracing::debug!(follower = %follower.id, followee = %followee.id, "Follow already removed");
        }
        false
    } else {
        match state.follows.follow(follower.id, followee.id).await {
            Ok(()) | Err(RepositoryError::AlreadyExists { .. }) => true,
            Err(err) => return Err(err.into()),
        }
    };

    let follower_count = state.follows.count_followers(followee.id).await?;
    Ok(FollowOutcome {
        following,
        follower_count,
    })
}
