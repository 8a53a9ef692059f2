//! Request and response types for the Netta client.
//!
//! Response types ignore the `success` flag; the client only decodes them
//! from successful responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use netta_core::{FriendshipStatus, NotificationKind, ProfileUpdate, Registration};

// ============================================================================
// Users
// ============================================================================

/// A user profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Email, only present on your own profile.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    pub full_name: Option<String>,
    /// Free-form bio.
    pub bio: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Location.
    pub location: Option<String>,
    /// Current level.
    pub level: i64,
    /// XP within the current level.
    pub xp: i64,
    /// Coins earned from level-ups.
    pub coins: i64,
    /// XP needed to leave the level, only present on your own profile.
    #[serde(default)]
    pub xp_to_next_level: Option<i64>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last authenticated request.
    pub last_seen: DateTime<Utc>,
}

/// Login request.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// The signed-in user.
    pub user: Profile,
}

/// Own profile response.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    /// The profile.
    pub user: Profile,
    /// Unread notifications.
    pub unread_notifications: i64,
}

/// Public profile response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    /// The profile.
    pub user: Profile,
    /// Whether you and this user are friends.
    pub is_friend: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: Profile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersEnvelope {
    pub users: Vec<Profile>,
}

// ============================================================================
// Posts
// ============================================================================

/// A post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    /// Post ID.
    pub id: String,
    /// Author ID.
    pub author_id: String,
    /// Author username.
    pub author_username: String,
    /// Text content.
    pub content: String,
    /// Attached image URL.
    pub image_url: Option<String>,
    /// Visible to friends only.
    pub is_private: bool,
    /// Number of likes.
    pub likes_count: i64,
    /// Number of comments.
    pub comments_count: i64,
    /// Whether you liked it.
    pub liked: bool,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

/// New post.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewPost {
    /// Text content.
    pub content: String,
    /// Optional image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Visible to friends only.
    pub is_private: bool,
}

/// Feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Feed {
    /// Posts, newest first.
    pub posts: Vec<Post>,
    /// Your username when authenticated.
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostEnvelope {
    pub post: Post,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostsEnvelope {
    pub posts: Vec<Post>,
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LikeToggle {
    /// Whether the post is liked now.
    pub liked: bool,
    /// The post's like count.
    pub likes_count: i64,
    /// XP awarded.
    pub xp_awarded: u32,
    /// Whether you reached a new level.
    pub leveled_up: bool,
    /// Your level.
    pub level: i64,
    /// Your XP within the level.
    pub xp: i64,
    /// Your coins.
    pub coins: i64,
}

/// A like on a post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Like {
    /// Who liked.
    pub user_id: String,
    /// Their username.
    pub username: String,
    /// When.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LikesEnvelope {
    pub likes: Vec<Like>,
}

/// A share.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Share {
    /// Share ID.
    pub id: String,
    /// The shared post, `None` once it was deleted.
    pub post_id: Option<String>,
    /// Comment on the share.
    pub comment: Option<String>,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShareEnvelope {
    pub share: Share,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SharesEnvelope {
    pub shares: Vec<Share>,
}

// ============================================================================
// Comments
// ============================================================================

/// A comment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Comment {
    /// Comment ID.
    pub id: String,
    /// The post.
    pub post_id: String,
    /// Author ID.
    pub author_id: String,
    /// Author username.
    pub author_username: String,
    /// Text content.
    pub content: String,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

/// Result of adding a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct AddedComment {
    /// The new comment.
    pub comment: Comment,
    /// The post's comment count.
    pub comments_count: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentsEnvelope {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentsCount {
    pub comments_count: i64,
}

// ============================================================================
// Friends, Notifications, Messages
// ============================================================================

/// A friendship edge, seen from your side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Friendship {
    /// The other user.
    pub username: String,
    /// Current status.
    pub status: FriendshipStatus,
    /// Whether you created the edge.
    pub outgoing: bool,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FriendshipEnvelope {
    pub friendship: Friendship,
}

/// A notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notification {
    /// Notification ID.
    pub id: String,
    /// What happened.
    pub kind: NotificationKind,
    /// Human-readable text.
    pub content: String,
    /// Related post, user, or message ID.
    pub reference_id: Option<String>,
    /// Whether it was read.
    pub is_read: bool,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

/// Notifications page.
#[derive(Debug, Clone, Deserialize)]
pub struct Notifications {
    /// Notifications, newest first.
    pub notifications: Vec<Notification>,
    /// Total unread.
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Updated {
    pub updated: u64,
}

/// A direct message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Message ID.
    pub id: String,
    /// Sender ID.
    pub sender_id: String,
    /// Recipient ID.
    pub recipient_id: String,
    /// Text content.
    pub content: String,
    /// Whether the recipient read it.
    pub is_read: bool,
    /// Sent timestamp.
    pub created_at: DateTime<Utc>,
}

/// A conversation page.
#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    /// The other participant.
    pub username: String,
    /// Messages, newest first.
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageEnvelope {
    pub message: Message,
}

// ============================================================================
// Errors
// ============================================================================

/// API error response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

/// Response with no payload.
#[derive(Debug, Deserialize)]
pub(crate) struct Ack {}

/// Paging for list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Maximum items to return; the server caps it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Items to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl Page {
    /// A page of `limit` items starting at `offset`.
    #[must_use]
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

/// Service health.
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    /// `"ok"` when healthy.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentRequest<'a> {
    pub post_id: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContentRequest<'a> {
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShareRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RespondRequest {
    pub accept: bool,
}
