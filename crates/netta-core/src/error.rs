//! Error types for Netta domain rules.

use crate::friendship::{FriendshipAction, FriendshipStatus};
use crate::ids::IdError;

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, SocialError>;

/// Errors raised by validation and state-transition rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SocialError {
    /// Username is empty, too long, or contains forbidden characters.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// Email address is malformed or too long.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Password is shorter than the minimum length.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Text content is empty after trimming.
    #[error("{field} must not be empty")]
    EmptyContent {
        /// Which field was empty.
        field: &'static str,
    },

    /// Text content exceeds its maximum length.
    #[error("{field} is longer than {max} characters")]
    ContentTooLong {
        /// Which field was too long.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },

    /// A user tried to befriend, block, or message themselves.
    #[error("cannot {action} yourself")]
    SelfAction {
        /// The attempted action.
        action: &'static str,
    },

    /// The friendship state machine does not allow this transition.
    #[error("cannot {action:?} a friendship in state {from:?}")]
    InvalidTransition {
        /// Current state, `None` when no edge exists yet.
        from: Option<FriendshipStatus>,
        /// Attempted action.
        action: FriendshipAction,
    },

    /// The acting user is not allowed to perform this action.
    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
