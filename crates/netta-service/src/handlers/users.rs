//! Profile handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use netta_core::{ProfileUpdate, Share, User};
use netta_store::Store;

use super::posts::{post_views, PostView};
use super::{are_friends, success, user_by_name, Page, Success};
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// A profile as anyone may see it.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Free-form bio.
    pub bio: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Location.
    pub location: Option<String>,
    /// Current level.
    pub level: i64,
    /// XP within the current level.
    pub xp: i64,
    /// Coins earned from level-ups.
    pub coins: i64,
    /// Registration timestamp.
    pub created_at: String,
    /// Last authenticated request.
    pub last_seen: String,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
            location: user.location.clone(),
            level: user.level,
            xp: user.xp,
            coins: user.coins,
            created_at: user.created_at.to_rfc3339(),
            last_seen: user.last_seen.to_rfc3339(),
        }
    }
}

/// The signed-in user's own profile.
#[derive(Debug, Serialize)]
pub struct OwnProfile {
    /// Public fields.
    #[serde(flatten)]
    pub profile: PublicProfile,
    /// Email address.
    pub email: String,
    /// XP needed to leave the current level.
    pub xp_to_next_level: i64,
}

impl From<&User> for OwnProfile {
    fn from(user: &User) -> Self {
        Self {
            profile: PublicProfile::from(user),
            email: user.email.clone(),
            xp_to_next_level: user.xp_to_next_level(),
        }
    }
}

/// Own profile response.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// The profile.
    pub user: OwnProfile,
    /// Unread notifications.
    pub unread_notifications: i64,
}

/// Public profile response.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// The profile.
    pub user: PublicProfile,
    /// Whether the viewer and this user are friends.
    pub is_friend: bool,
}

/// Get the signed-in user's profile.
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Success<MeResponse>>, ApiError> {
    let unread_notifications = state.store.unread_notification_count(&auth.id()).await?;

    Ok(success(MeResponse {
        user: OwnProfile::from(&auth.user),
        unread_notifications,
    }))
}

/// Update the signed-in user's profile fields.
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Result<Json<Success<MeResponse>>, ApiError> {
    let user = state.store.update_profile(&auth.id(), body).await?;
    let unread_notifications = state.store.unread_notification_count(&user.id).await?;

    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(success(MeResponse {
        user: OwnProfile::from(&user),
        unread_notifications,
    }))
}

/// Get a user's public profile.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    viewer: MaybeAuthUser,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<Success<ProfileResponse>>, ApiError> {
    let user = user_by_name(state.store.as_ref(), &username).await?;
    let is_friend = match viewer.id() {
        Some(viewer) if viewer != user.id => {
            are_friends(state.store.as_ref(), &viewer, &user.id).await?
        }
        _ => false,
    };

    Ok(success(ProfileResponse {
        user: PublicProfile::from(&user),
        is_friend,
    }))
}

/// Posts response.
#[derive(Debug, Serialize)]
pub struct PostsResponse {
    /// The posts, newest first.
    pub posts: Vec<PostView>,
}

/// List a user's posts visible to the viewer.
pub async fn list_user_posts(
    State(state): State<Arc<AppState>>,
    viewer: MaybeAuthUser,
    ApiPath(username): ApiPath<String>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Success<PostsResponse>>, ApiError> {
    let store = state.store.as_ref();
    let author = user_by_name(store, &username).await?;
    let viewer_id = viewer.id();

    let posts = store
        .list_posts_by_author(&author.id, viewer_id.as_ref(), page.limit(), page.offset())
        .await?;

    Ok(success(PostsResponse {
        posts: post_views(store, posts, viewer_id.as_ref()).await?,
    }))
}

/// A share as listed on a profile.
#[derive(Debug, Serialize)]
pub struct ShareView {
    /// Share ID.
    pub id: String,
    /// The shared post, `None` once it has been deleted.
    pub post_id: Option<String>,
    /// The sharer's comment.
    pub comment: Option<String>,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Share> for ShareView {
    fn from(share: &Share) -> Self {
        Self {
            id: share.id.to_string(),
            post_id: share.post_id.map(|id| id.to_string()),
            comment: share.comment.clone(),
            created_at: share.created_at.to_rfc3339(),
        }
    }
}

/// Shares response.
#[derive(Debug, Serialize)]
pub struct SharesResponse {
    /// The shares, newest first.
    pub shares: Vec<ShareView>,
}

/// List a user's shares.
pub async fn list_user_shares(
    State(state): State<Arc<AppState>>,
    ApiPath(username): ApiPath<String>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Success<SharesResponse>>, ApiError> {
    let user = user_by_name(state.store.as_ref(), &username).await?;
    let shares = state
        .store
        .list_shares_by_user(&user.id, page.limit(), page.offset())
        .await?;

    Ok(success(SharesResponse {
        shares: shares.iter().map(ShareView::from).collect(),
    }))
}
