//! Direct messages between two users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::post::MAX_COMMENT_LENGTH;
use crate::validation::validate_content;
use crate::{MessageId, Result, SocialError, UserId};

/// A direct message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The message ID.
    pub id: MessageId,
    /// Sender.
    pub sender_id: UserId,
    /// Recipient.
    pub recipient_id: UserId,
    /// Message body.
    pub content: String,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// When the message was sent.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new unread message.
    ///
    /// # Errors
    ///
    /// Returns `SelfAction` when messaging yourself, or a content error.
    pub fn new(sender_id: UserId, recipient_id: UserId, content: &str) -> Result<Self> {
        if sender_id == recipient_id {
            return Err(SocialError::SelfAction { action: "message" });
        }
        let content = validate_content("message", content, MAX_COMMENT_LENGTH)?;
        Ok(Self {
            id: MessageId::generate(),
            sender_id,
            recipient_id,
            content,
            is_read: false,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_message_self() {
        let user = UserId::generate();
        assert!(matches!(
            Message::new(user, user, "hi"),
            Err(SocialError::SelfAction { action: "message" })
        ));
    }

    #[test]
    fn message_starts_unread() {
        let message = Message::new(UserId::generate(), UserId::generate(), " hi ").unwrap();
        assert_eq!(message.content, "hi");
        assert!(!message.is_read);
    }
}
