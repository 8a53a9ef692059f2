//! SQLite storage layer for Netta.
//!
//! This crate provides persistent storage for users, posts, likes, comments,
//! shares, friendships, notifications, and messages using SQLite through `sqlx`.
//!
//! # Architecture
//!
//! The schema lives in `migrations/` and is applied on connect. Single-row reads
//! and writes are plain queries; the operations that touch several rows
//! (like toggling, commenting, friendship transitions, messaging) run in one
//! transaction so counters, XP, and notifications never drift apart.
//!
//! # Example
//!
//! ```no_run
//! use netta_store::{SqliteStore, Store};
//! use netta_core::{Post, User};
//!
//! # async fn example() -> netta_store::Result<()> {
//! let store = SqliteStore::connect("sqlite://netta.db?mode=rwc").await?;
//!
//! let user = User::new("alice".into(), "alice@example.com".into(), "hash".into());
//! store.create_user(&user).await?;
//!
//! let post = Post::new(user.id, "hello", None, false)?;
//! store.create_post(&post).await?;
//!
//! let outcome = store.toggle_like(&user.id, &post.id).await?;
//! assert!(outcome.liked);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod outcome;
mod rows;
pub mod schema;
pub mod sqlite;

pub use error::{Result, StoreError};
pub use outcome::{CommentOutcome, LikeOutcome};
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use netta_core::{
    Comment, CommentId, Friendship, FriendshipAction, Like, Message, Notification, NotificationId,
    Post, PostId, ProfileUpdate, Session, SessionId, Share, User, UserId,
};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer so handlers do not depend on SQLite.
#[async_trait]
pub trait Store: Send + Sync {
    /// Run a trivial query to check the database is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    async fn ping(&self) -> Result<()>;

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UsernameTaken` or `StoreError::EmailTaken`, checked in that order.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Get a user by username (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Update profile fields and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User>;

    /// Refresh `last_seen` to now.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn touch_last_seen(&self, user_id: &UserId) -> Result<()>;

    /// Number of registered users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn count_users(&self) -> Result<i64>;

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Record a new login session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn create_session(&self, session: &Session) -> Result<()>;

    /// Get a session by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_session(&self, session_id: &SessionId) -> Result<Option<Session>>;

    /// Delete a session. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn delete_session(&self, session_id: &SessionId) -> Result<bool>;

    // =========================================================================
    // Post Operations
    // =========================================================================

    /// Insert a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn create_post(&self, post: &Post) -> Result<()>;

    /// Get a post by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_post(&self, post_id: &PostId) -> Result<Option<Post>>;

    /// Delete a post and, by cascade, its likes and comments. Shares survive.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the post doesn't exist.
    /// - `StoreError::Forbidden` if `actor` is not the author.
    async fn delete_post(&self, post_id: &PostId, actor: &UserId) -> Result<()>;

    /// Posts by one author visible to `viewer`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_posts_by_author(
        &self,
        author_id: &UserId,
        viewer: Option<&UserId>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Post>>;

    /// The home feed: public posts, the viewer's own posts, and posts by accepted
    /// friends, newest first. Anonymous viewers only see public posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn feed(&self, viewer: Option<&UserId>, limit: usize, offset: usize)
        -> Result<Vec<Post>>;

    // =========================================================================
    // Like Operations
    // =========================================================================

    /// Toggle a like: remove it if present, otherwise add it, award XP, and
    /// notify the author.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user or post doesn't exist.
    async fn toggle_like(&self, user_id: &UserId, post_id: &PostId) -> Result<LikeOutcome>;

    /// Whether `user_id` currently likes `post_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn has_liked(&self, user_id: &UserId, post_id: &PostId) -> Result<bool>;

    /// Likes on a post, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_likes(&self, post_id: &PostId, limit: usize, offset: usize)
        -> Result<Vec<Like>>;

    // =========================================================================
    // Comment Operations
    // =========================================================================

    /// Insert a comment, bump the post counter, and notify the author.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the post doesn't exist.
    async fn add_comment(&self, comment: &Comment) -> Result<CommentOutcome>;

    /// Comments on a post, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_comments(
        &self,
        post_id: &PostId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>>;

    /// Delete a comment. Allowed for its author and the post's author.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the comment doesn't exist.
    /// - `StoreError::Forbidden` for anyone else.
    async fn delete_comment(&self, comment_id: &CommentId, actor: &UserId)
        -> Result<CommentOutcome>;

    // =========================================================================
    // Share Operations
    // =========================================================================

    /// Record a share.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the post doesn't exist.
    async fn share_post(&self, share: &Share) -> Result<()>;

    /// Shares made by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_shares_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Share>>;

    // =========================================================================
    // Friendship Operations
    // =========================================================================

    /// The edge between two users, whichever direction it points.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_friendship(&self, a: &UserId, b: &UserId) -> Result<Option<Friendship>>;

    /// Apply a friendship action by `actor` towards `other` and persist the result.
    ///
    /// New requests notify the addressee; acceptances notify the requester.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if `other` doesn't exist.
    /// - `StoreError::Domain` when the state machine rejects the action.
    async fn friendship_action(
        &self,
        actor: &UserId,
        other: &UserId,
        action: FriendshipAction,
    ) -> Result<Friendship>;

    /// Delete the edge between two users.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if there is no edge.
    /// - `StoreError::Domain` if `actor` is the blocked side of a block.
    async fn remove_friendship(&self, actor: &UserId, other: &UserId) -> Result<()>;

    /// Users on the other end of any accepted edge touching `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_friends(&self, user_id: &UserId) -> Result<Vec<User>>;

    /// Users with a pending request addressed to `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_friend_requests(&self, user_id: &UserId) -> Result<Vec<User>>;

    // =========================================================================
    // Notification Operations
    // =========================================================================

    /// Notifications for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_notifications(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Notification>>;

    /// Number of unread notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn unread_notification_count(&self, user_id: &UserId) -> Result<i64>;

    /// Mark one notification read.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` unless it exists and belongs to `user_id`.
    async fn mark_notification_read(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<()>;

    /// Mark all of a user's notifications read. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn mark_all_notifications_read(&self, user_id: &UserId) -> Result<u64>;

    // =========================================================================
    // Message Operations
    // =========================================================================

    /// Store a message and notify the recipient.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the recipient doesn't exist.
    async fn send_message(&self, message: &Message) -> Result<()>;

    /// Messages exchanged between two users, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn conversation(
        &self,
        a: &UserId,
        b: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>>;

    /// Mark messages from `other` to `reader` read. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn mark_conversation_read(&self, reader: &UserId, other: &UserId) -> Result<u64>;
}
