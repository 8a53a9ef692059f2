//! Health check handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::{success, Success};
use crate::error::ApiError;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Health check endpoint. Fails with 500 when the database is unreachable.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Success<HealthResponse>>, ApiError> {
    state.store.ping().await?;

    Ok(success(HealthResponse {
        status: "ok".to_string(),
        service: "netta".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
