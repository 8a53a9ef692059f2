//! Notifications fanned out as a side effect of social actions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{NotificationId, UserId};

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone liked the recipient's post.
    Like,
    /// Someone commented on the recipient's post.
    Comment,
    /// Someone sent the recipient a friend request.
    FriendRequest,
    /// Someone accepted the recipient's friend request.
    FriendAccepted,
    /// Someone sent the recipient a message.
    Message,
}

impl NotificationKind {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::FriendRequest => "friend_request",
            Self::FriendAccepted => "friend_accepted",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "comment" => Ok(Self::Comment),
            "friend_request" => Ok(Self::FriendRequest),
            "friend_accepted" => Ok(Self::FriendAccepted),
            "message" => Ok(Self::Message),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// A notification addressed to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// The notification ID.
    pub id: NotificationId,

    /// Recipient.
    pub user_id: UserId,

    /// What happened.
    pub kind: NotificationKind,

    /// Human-readable text.
    pub content: String,

    /// ID of the related entity (post, comment, user, message). Untyped.
    pub reference_id: Option<String>,

    /// Whether the recipient has read it.
    pub is_read: bool,

    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build a notification for `recipient` caused by `actor`.
    ///
    /// Returns `None` when the actor is the recipient: nobody is notified about
    /// their own actions.
    #[must_use]
    pub fn for_action(
        recipient: UserId,
        actor: UserId,
        kind: NotificationKind,
        content: String,
        reference_id: Option<String>,
    ) -> Option<Self> {
        (recipient != actor).then(|| Self {
            id: NotificationId::generate(),
            user_id: recipient,
            kind,
            content,
            reference_id,
            is_read: false,
            created_at: Utc::now(),
        })
    }
}
