//! Like handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use netta_core::PostId;
use netta_store::Store;

use super::{success, visible_post, Page, Success, Usernames};
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::state::AppState;

/// Toggle like response.
#[derive(Debug, Serialize)]
pub struct ToggleLikeResponse {
    /// Whether the post is liked after the toggle.
    pub liked: bool,
    /// The post's like count.
    pub likes_count: i64,
    /// XP awarded for this toggle.
    pub xp_awarded: u32,
    /// Whether the liker reached a new level.
    pub leveled_up: bool,
    /// The liker's level.
    pub level: i64,
    /// The liker's XP within the level.
    pub xp: i64,
    /// The liker's coins.
    pub coins: i64,
}

/// Like a post, or remove the like if it is already there.
///
/// A new like awards the liker XP; removing one does not take it back.
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(post_id): ApiPath<PostId>,
) -> Result<Json<Success<ToggleLikeResponse>>, ApiError> {
    let user_id = auth.id();
    visible_post(state.store.as_ref(), &post_id, Some(&user_id)).await?;

    let outcome = state.store.toggle_like(&user_id, &post_id).await?;

    tracing::info!(
        user_id = %user_id,
        post_id = %post_id,
        liked = outcome.liked,
        likes_count = outcome.likes_count,
        "Like toggled"
    );

    let response = match outcome.progress {
        Some(progress) => {
            if progress.leveled_up() {
                tracing::info!(user_id = %user_id, level = progress.level, "Level up");
            }
            ToggleLikeResponse {
                liked: outcome.liked,
                likes_count: outcome.likes_count,
                xp_awarded: progress.xp_awarded,
                leveled_up: progress.leveled_up(),
                level: progress.level,
                xp: progress.xp,
                coins: progress.coins,
            }
        }
        None => ToggleLikeResponse {
            liked: outcome.liked,
            likes_count: outcome.likes_count,
            xp_awarded: 0,
            leveled_up: false,
            level: auth.user.level,
            xp: auth.user.xp,
            coins: auth.user.coins,
        },
    };

    Ok(success(response))
}

/// A like as listed on a post.
#[derive(Debug, Serialize)]
pub struct LikeView {
    /// Who liked.
    pub user_id: String,
    /// Their username.
    pub username: String,
    /// When.
    pub created_at: String,
}

/// Likes response.
#[derive(Debug, Serialize)]
pub struct LikesResponse {
    /// Likes, newest first.
    pub likes: Vec<LikeView>,
}

/// List who liked a post.
pub async fn list_likes(
    State(state): State<Arc<AppState>>,
    viewer: MaybeAuthUser,
    ApiPath(post_id): ApiPath<PostId>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Success<LikesResponse>>, ApiError> {
    let store = state.store.as_ref();
    visible_post(store, &post_id, viewer.id().as_ref()).await?;

    let likes = store
        .list_likes(&post_id, page.limit(), page.offset())
        .await?;

    let mut names = Usernames::new(store);
    let mut views = Vec::with_capacity(likes.len());
    for like in likes {
        views.push(LikeView {
            user_id: like.user_id.to_string(),
            username: names.get(like.user_id).await?,
            created_at: like.created_at.to_rfc3339(),
        });
    }

    Ok(success(LikesResponse { likes: views }))
}
