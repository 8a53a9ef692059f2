//! API error types and responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use netta_core::SocialError;
use netta_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, invalid, or revoked credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Valid credentials but the action is not allowed for this user.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - resource already exists or invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    /// The HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Unauthorized => "Authentication required".to_string(),
            Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                "An internal error occurred".to_string()
            }
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.code(),
                message,
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<SocialError> for ApiError {
    fn from(err: SocialError) -> Self {
        match err {
            SocialError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
            SocialError::NotAllowed(msg) => Self::Forbidden(msg),
            _ => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, .. } => Self::NotFound(format!("{entity} not found")),
            StoreError::UsernameTaken => Self::Conflict("Username already taken".into()),
            StoreError::EmailTaken => Self::Conflict("Email already in use".into()),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Forbidden(msg) => Self::Forbidden(msg),
            StoreError::Domain(err) => err.into(),
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netta_core::{FriendshipAction, FriendshipStatus};

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::UsernameTaken, StatusCode::CONFLICT),
            (StoreError::EmailTaken, StatusCode::CONFLICT),
            (
                StoreError::NotFound {
                    entity: "post",
                    id: "x".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (StoreError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (
                StoreError::Database("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn domain_errors_map_through_the_store() {
        let transition = StoreError::Domain(SocialError::InvalidTransition {
            from: Some(FriendshipStatus::Accepted),
            action: FriendshipAction::Request,
        });
        assert_eq!(ApiError::from(transition).status(), StatusCode::CONFLICT);

        let too_short = SocialError::PasswordTooShort { min: 6 };
        assert_eq!(ApiError::from(too_short).code(), "bad_request");

        let blocked = SocialError::NotAllowed("blocked".into());
        assert_eq!(ApiError::from(blocked).status(), StatusCode::FORBIDDEN);
    }
}
