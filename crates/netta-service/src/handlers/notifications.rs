//! Notification handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use netta_core::{Notification, NotificationId, NotificationKind};
use netta_store::Store;

use super::{success, Empty, Page, Success};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::state::AppState;

/// A notification as returned by the API.
#[derive(Debug, Serialize)]
pub struct NotificationView {
    /// Notification ID.
    pub id: String,
    /// What happened.
    pub kind: NotificationKind,
    /// Human-readable text.
    pub content: String,
    /// ID of the related post, user, or message.
    pub reference_id: Option<String>,
    /// Whether it has been read.
    pub is_read: bool,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Notification> for NotificationView {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            kind: n.kind,
            content: n.content.clone(),
            reference_id: n.reference_id.clone(),
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// Notifications response.
#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    /// Notifications, newest first.
    pub notifications: Vec<NotificationView>,
    /// Total unread notifications.
    pub unread_count: i64,
}

/// List the signed-in user's notifications.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Success<NotificationsResponse>>, ApiError> {
    let notifications = state
        .store
        .list_notifications(&auth.id(), page.limit(), page.offset())
        .await?;
    let unread_count = state.store.unread_notification_count(&auth.id()).await?;

    Ok(success(NotificationsResponse {
        notifications: notifications.iter().map(NotificationView::from).collect(),
        unread_count,
    }))
}

/// Mark one notification read.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(notification_id): ApiPath<NotificationId>,
) -> Result<Json<Success<Empty>>, ApiError> {
    state
        .store
        .mark_notification_read(&auth.id(), &notification_id)
        .await?;
    Ok(success(Empty {}))
}

/// Mark all response.
#[derive(Debug, Serialize)]
pub struct MarkAllResponse {
    /// How many notifications changed.
    pub updated: u64,
}

/// Mark every notification read.
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Success<MarkAllResponse>>, ApiError> {
    let updated = state.store.mark_all_notifications_read(&auth.id()).await?;

    tracing::debug!(user_id = %auth.id(), updated, "Notifications marked read");

    Ok(success(MarkAllResponse { updated }))
}
