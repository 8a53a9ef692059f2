//! Direct message handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use netta_core::Message;
use netta_store::Store;

use super::{success, user_by_name, Page, Success};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// A message as returned by the API.
#[derive(Debug, Serialize)]
pub struct MessageView {
    /// Message ID.
    pub id: String,
    /// Sender ID.
    pub sender_id: String,
    /// Recipient ID.
    pub recipient_id: String,
    /// Text content.
    pub content: String,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// Sent timestamp.
    pub created_at: String,
}

impl From<&Message> for MessageView {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.to_string(),
            sender_id: m.sender_id.to_string(),
            recipient_id: m.recipient_id.to_string(),
            content: m.content.clone(),
            is_read: m.is_read,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Conversation response.
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    /// The other participant.
    pub username: String,
    /// Messages in both directions, newest first.
    pub messages: Vec<MessageView>,
}

/// Read the conversation with a user. Marks their messages to you as read.
pub async fn conversation(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(username): ApiPath<String>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Success<ConversationResponse>>, ApiError> {
    let other = user_by_name(state.store.as_ref(), &username).await?;

    let messages = state
        .store
        .conversation(&auth.id(), &other.id, page.limit(), page.offset())
        .await?;
    state
        .store
        .mark_conversation_read(&auth.id(), &other.id)
        .await?;

    Ok(success(ConversationResponse {
        username: other.username,
        messages: messages.iter().map(MessageView::from).collect(),
    }))
}

/// Send message request.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Text content.
    pub content: String,
}

/// Send message response.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    /// The sent message.
    pub message: MessageView,
}

/// Send a direct message.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(username): ApiPath<String>,
    ApiJson(body): ApiJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<Success<SendMessageResponse>>), ApiError> {
    let recipient = user_by_name(state.store.as_ref(), &username).await?;
    let message = Message::new(auth.id(), recipient.id, &body.content)?;
    state.store.send_message(&message).await?;

    tracing::info!(
        user_id = %auth.id(),
        recipient_id = %recipient.id,
        message_id = %message.id,
        "Message sent"
    );

    Ok((
        StatusCode::CREATED,
        success(SendMessageResponse {
            message: MessageView::from(&message),
        }),
    ))
}
