//! Friendship handlers.
//!
//! Every route names the other user by username. The edge between two users is
//! shared, so the same edge is returned whichever side asks.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use netta_core::{Friendship, FriendshipAction, FriendshipStatus, User};
use netta_store::Store;

use super::users::PublicProfile;
use super::{success, user_by_name, Empty, Success};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// A friendship edge, seen from one side.
#[derive(Debug, Serialize)]
pub struct FriendshipView {
    /// The other user.
    pub username: String,
    /// Current status.
    pub status: FriendshipStatus,
    /// Whether the viewer created the edge (sent the request or the block).
    pub outgoing: bool,
    /// Last change timestamp.
    pub updated_at: String,
}

impl FriendshipView {
    fn new(edge: &Friendship, viewer: &User, other: &User) -> Self {
        Self {
            username: other.username.clone(),
            status: edge.status,
            outgoing: edge.user_id == viewer.id,
            updated_at: edge.updated_at.to_rfc3339(),
        }
    }
}

/// Single friendship response.
#[derive(Debug, Serialize)]
pub struct FriendshipResponse {
    /// The edge after the change.
    pub friendship: FriendshipView,
}

/// Users response.
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    /// The users.
    pub users: Vec<PublicProfile>,
}

/// List accepted friends, whichever side sent the request.
pub async fn list_friends(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Success<UsersResponse>>, ApiError> {
    let friends = state.store.list_friends(&auth.id()).await?;
    Ok(success(UsersResponse {
        users: friends.iter().map(PublicProfile::from).collect(),
    }))
}

/// List users with a pending request to the signed-in user.
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Success<UsersResponse>>, ApiError> {
    let requesters = state.store.list_friend_requests(&auth.id()).await?;
    Ok(success(UsersResponse {
        users: requesters.iter().map(PublicProfile::from).collect(),
    }))
}

async fn act(
    state: &AppState,
    auth: &AuthUser,
    username: &str,
    action: FriendshipAction,
) -> Result<Json<Success<FriendshipResponse>>, ApiError> {
    let other = user_by_name(state.store.as_ref(), username).await?;
    let edge = state
        .store
        .friendship_action(&auth.id(), &other.id, action)
        .await?;

    tracing::info!(
        user_id = %auth.id(),
        other_id = %other.id,
        action = ?action,
        status = %edge.status,
        "Friendship changed"
    );

    Ok(success(FriendshipResponse {
        friendship: FriendshipView::new(&edge, &auth.user, &other),
    }))
}

/// Send a friend request. Requesting someone who already asked you accepts.
pub async fn send_request(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<Success<FriendshipResponse>>, ApiError> {
    act(&state, &auth, &username, FriendshipAction::Request).await
}

/// Respond request.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    /// `true` to accept, `false` to reject.
    pub accept: bool,
}

/// Accept or reject an incoming request.
pub async fn respond(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(username): ApiPath<String>,
    ApiJson(body): ApiJson<RespondRequest>,
) -> Result<Json<Success<FriendshipResponse>>, ApiError> {
    let action = if body.accept {
        FriendshipAction::Accept
    } else {
        FriendshipAction::Reject
    };
    act(&state, &auth, &username, action).await
}

/// Block a user.
pub async fn block(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<Success<FriendshipResponse>>, ApiError> {
    act(&state, &auth, &username, FriendshipAction::Block).await
}

/// Remove the edge with a user: unfriend, cancel, or unblock.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<Success<Empty>>, ApiError> {
    let other = user_by_name(state.store.as_ref(), &username).await?;
    state.store.remove_friendship(&auth.id(), &other.id).await?;

    tracing::info!(user_id = %auth.id(), other_id = %other.id, "Friendship removed");

    Ok(success(Empty {}))
}
