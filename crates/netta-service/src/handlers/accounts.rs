//! Registration, login, and logout handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use netta_core::{Registration, Session, User};
use netta_store::Store;

use super::users::OwnProfile;
use super::{success, Empty, Success};
use crate::auth::{hash_password, issue_token, verify_password, AuthUser};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Registration response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// The new account.
    pub user: OwnProfile,
}

/// Create an account.
///
/// Checks, in order: password confirmation, password length, username and
/// email format, then username and email uniqueness.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Registration>,
) -> Result<(StatusCode, Json<Success<RegisterResponse>>), ApiError> {
    let (username, email) = body.validate()?;
    let password_hash = hash_password(&body.password)?;

    let user = User::new(username, email, password_hash);
    state.store.create_user(&user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        success(RegisterResponse {
            user: OwnProfile::from(&user),
        }),
    ))
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    /// Always `"Bearer"`.
    pub token_type: &'static str,
    /// When the token stops working.
    pub expires_at: String,
    /// The signed-in user.
    pub user: OwnProfile,
}

/// Exchange a username and password for a session token.
///
/// Unknown usernames and wrong passwords get the same answer.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<Success<LoginResponse>>, ApiError> {
    let user = state
        .store
        .get_user_by_username(&body.username)
        .await?
        .filter(|user| verify_password(&body.password, &user.password_hash))
        .ok_or_else(|| {
            tracing::debug!(username = %body.username, "Login failed");
            ApiError::Unauthorized
        })?;

    let session = Session::new(user.id, state.config.token_ttl());
    state.store.create_session(&session).await?;
    state.store.touch_last_seen(&user.id).await?;
    let token = issue_token(&state, &session)?;

    tracing::info!(user_id = %user.id, session_id = %session.id, "User logged in");

    Ok(success(LoginResponse {
        token,
        token_type: "Bearer",
        expires_at: session.expires_at.to_rfc3339(),
        user: OwnProfile::from(&user),
    }))
}

/// Revoke the session behind the presented token.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Success<Empty>>, ApiError> {
    state.store.delete_session(&auth.session_id).await?;

    tracing::info!(user_id = %auth.id(), session_id = %auth.session_id, "User logged out");

    Ok(success(Empty {}))
}
