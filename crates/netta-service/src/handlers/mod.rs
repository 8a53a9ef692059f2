//! HTTP request handlers.
//!
//! Successful responses are JSON objects carrying `"success": true` next to
//! the payload fields; failures are rendered by [`ApiError`].

pub mod accounts;
pub mod comments;
pub mod friends;
pub mod health;
pub mod likes;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod users;

use std::collections::HashMap;

use axum::Json;
use serde::{Deserialize, Serialize};

use netta_core::{FriendshipStatus, Post, PostId, User, UserId};
use netta_store::Store;

use crate::error::ApiError;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// A successful response body: `{"success": true, ...payload}`.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    payload: T,
}

/// Wrap a payload in a success body.
pub fn success<T: Serialize>(payload: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        payload,
    })
}

/// An empty payload, for endpoints that only report success.
#[derive(Debug, Serialize)]
pub struct Empty {}

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Page {
    /// Maximum items to return.
    pub limit: Option<usize>,
    /// Items to skip.
    pub offset: Option<usize>,
}

impl Page {
    /// The effective limit, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// The effective offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// Load a user by username or fail with `NotFound`.
pub(crate) async fn user_by_name(store: &dyn Store, username: &str) -> Result<User, ApiError> {
    store
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))
}

/// Whether `viewer` and `other` are accepted friends.
pub(crate) async fn are_friends(
    store: &dyn Store,
    viewer: &UserId,
    other: &UserId,
) -> Result<bool, ApiError> {
    Ok(store
        .get_friendship(viewer, other)
        .await?
        .is_some_and(|edge| edge.status == FriendshipStatus::Accepted))
}

/// Load a post the viewer is allowed to see.
///
/// Private posts of non-friends look exactly like missing ones.
pub(crate) async fn visible_post(
    store: &dyn Store,
    post_id: &PostId,
    viewer: Option<&UserId>,
) -> Result<Post, ApiError> {
    let not_found = || ApiError::NotFound("post not found".into());
    let post = store.get_post(post_id).await?.ok_or_else(not_found)?;

    if !post.is_private {
        return Ok(post);
    }
    let allowed = match viewer {
        Some(viewer) if *viewer == post.author_id => true,
        Some(viewer) => are_friends(store, viewer, &post.author_id).await?,
        None => false,
    };
    if allowed {
        Ok(post)
    } else {
        Err(not_found())
    }
}

/// Resolves user IDs to usernames, remembering each lookup.
pub(crate) struct Usernames<'a> {
    store: &'a dyn Store,
    cache: HashMap<UserId, String>,
}

impl<'a> Usernames<'a> {
    pub(crate) fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// Seed the cache with a user already in hand.
    pub(crate) fn remember(&mut self, user: &User) {
        self.cache.insert(user.id, user.username.clone());
    }

    /// The username for `id`. Unknown users resolve to an empty string.
    pub(crate) async fn get(&mut self, id: UserId) -> Result<String, ApiError> {
        if let Some(name) = self.cache.get(&id) {
            return Ok(name.clone());
        }
        let name = self
            .store
            .get_user(&id)
            .await?
            .map(|user| user.username)
            .unwrap_or_default();
        self.cache.insert(id, name.clone());
        Ok(name)
    }
}
