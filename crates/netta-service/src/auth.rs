//! Authentication: password hashing, session tokens, and extractors.
//!
//! A login creates a [`Session`] row and hands out an HS256 JWT naming it.
//! Requests authenticate with `Authorization: Bearer <token>`; the token must
//! verify, and the session it names must still exist and belong to the same
//! user. Logging out deletes the session, which revokes the token.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};

use netta_core::{Session, SessionId, User, UserId};

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Passwords
// ============================================================================

/// Hash a password with Argon2id and a random salt.
///
/// # Errors
///
/// Returns `ApiError::Internal` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))
}

/// Check a password against a stored PHC hash string.
///
/// A malformed stored hash never verifies.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("Stored password hash is malformed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// ============================================================================
// Tokens
// ============================================================================

/// JWT claims for a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Session ID.
    pub sid: String,
    /// Issued at.
    pub iat: i64,
    /// Expiration time.
    pub exp: i64,
}

/// Sign a token for `session`.
///
/// # Errors
///
/// Returns `ApiError::Internal` if encoding fails.
pub fn issue_token(state: &AppState, session: &Session) -> Result<String, ApiError> {
    let claims = Claims {
        sub: session.user_id.to_string(),
        sid: session.id.to_string(),
        iat: session.created_at.timestamp(),
        exp: session.expires_at.timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &state.encoding_key)
        .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
}

/// Verify a token's signature and expiry.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for any invalid token.
pub fn verify_token(state: &AppState, token: &str) -> Result<Claims, ApiError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &state.decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            ApiError::Unauthorized
        })
}

// ============================================================================
// Extractors
// ============================================================================

/// An authenticated user, resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user, as loaded for this request.
    pub user: User,
    /// The session the token names.
    pub session_id: SessionId,
}

impl AuthUser {
    /// The user ID.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

/// An authenticated user if the request carries a token, `None` otherwise.
///
/// A token that is present but invalid is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    /// The user ID, if authenticated.
    #[must_use]
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(AuthUser::id)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or(ApiError::Unauthorized)?;
        authenticate(state, token).await
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(Self(Some(authenticate(state, token).await?))),
            None => Ok(Self(None)),
        }
    }
}

/// The bearer token from the `Authorization` header, if there is one.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(header) = parts.headers.get("authorization") else {
        return Ok(None);
    };

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or(ApiError::Unauthorized)
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let claims = verify_token(state, token)?;

    let user_id = claims
        .sub
        .parse::<UserId>()
        .map_err(|_| ApiError::Unauthorized)?;
    let session_id = claims
        .sid
        .parse::<SessionId>()
        .map_err(|_| ApiError::Unauthorized)?;

    let session = state
        .store
        .get_session(&session_id)
        .await?
        .ok_or_else(|| {
            tracing::debug!(session_id = %session_id, "Session revoked or unknown");
            ApiError::Unauthorized
        })?;

    if session.user_id != user_id || session.is_expired_at(Utc::now()) {
        tracing::debug!(session_id = %session_id, "Session expired or mismatched");
        return Err(ApiError::Unauthorized);
    }

    let user = state
        .store
        .get_user(&user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    state.store.touch_last_seen(&user_id).await?;

    Ok(AuthUser { user, session_id })
}
