//! Comments on a pin.

use uuid::Uuid;

use pinboard_core::cache::{comments_key, comments_pattern};
use pinboard_core::domain::{CommentView, CreateCommentRequest, User};
use pinboard_core::pagination::Pagination;
use pinboard_core::response::PageEnvelope;

use super::{author_summaries, require_pin};
use crate::state::AppState;

/// One page of a pin's comments, newest first.
///
/// The pin must exist; the check runs before the listing so a missing pin
/// never caches anything.
pub async fn list_comments(
    state: &AppState,
    pin_id: Uuid,
    pagination: Pagination,
) -> anyhow::Result<PageEnvelope<CommentView>> {
    let key = comments_key(pin_id, &pagination);
    let ttl = state.config.cache_ttl();

    state
        .cache
        .get_or_fetch(&key, Some(ttl), move || async move {
            require_pin(state, pin_id).await?;

            let (comments, total) = tokio::try_join!(
                state
                    .comments
                    .list_comments(pin_id, pagination.skip(), pagination.limit),
                state.comments.count_comments(pin_id),
            )?;

            let authors = author_summaries(state, comments.iter().map(|c| c.user_id)).await?;
            let views = comments
                .into_iter()
                .map(|comment| {
                    let user = authors.get(&comment.user_id).cloned();
                    CommentView::new(comment, user)
                })
                .collect();

            Ok::<_, anyhow::Error>(PageEnvelope::new(views, total, &pagination))
        })
        .await
}

/// Adds a comment by `user` and drops every cached comment page of the pin.
pub async fn add_comment(
    state: &AppState,
    user: &User,
    pin_id: Uuid,
    request: CreateCommentRequest,
) -> anyhow::Result<CommentView> {
    let comment = request.validate(pin_id, user.id)?;
    require_pin(state, pin_id).await?;

    state.comments.create_comment(&comment).await?;
    tracing::debug!(comment_id = %comment.id, %pin_id, "Comment added");

    state
        .cache
        .invalidate(&[], &[comments_pattern(pin_id)])
        .await;

    Ok(CommentView::new(comment, Some(user.summary())))
}
