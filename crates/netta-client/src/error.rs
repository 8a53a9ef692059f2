//! Client error types.

/// Errors that can occur when using the Netta client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The token is missing, invalid, or revoked.
    #[error("unauthorized")]
    Unauthorized,

    /// The resource does not exist or is not visible.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate registration or an illegal friendship transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A call needing a session was made before logging in.
    #[error("not logged in")]
    NotLoggedIn,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
