//! Error types for Netta storage.

use netta_core::SocialError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// A stored value could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The username is already registered.
    #[error("username already taken")]
    UsernameTaken,

    /// The email is already registered.
    #[error("email already in use")]
    EmailTaken,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The acting user may not touch this record.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] SocialError),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                let message = db.message();
                if message.contains("users.username") {
                    Self::UsernameTaken
                } else if message.contains("users.email") {
                    Self::EmailTaken
                } else {
                    Self::Conflict(message.to_string())
                }
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Database(format!("migration failed: {err}"))
    }
}
