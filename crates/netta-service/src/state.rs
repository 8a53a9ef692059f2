//! Application state.

use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};
use netta_store::Store;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Key for signing session tokens.
    pub encoding_key: EncodingKey,

    /// Key for verifying session tokens.
    pub decoding_key: DecodingKey,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        if config.uses_dev_secret() {
            tracing::warn!("Session tokens are signed with the development key");
        }

        let secret = config.secret_key.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            store,
            config,
        }
    }
}
