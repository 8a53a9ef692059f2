//! Core types and social rules for Netta.
//!
//! This crate provides the foundational types used throughout the Netta platform:
//!
//! - **Identifiers**: `UserId`, `PostId`, `CommentId`, `NotificationId`, `MessageId`,
//!   `ShareId`, `SessionId`
//! - **Sessions**: `Session`
//! - **Users**: `User`, `LevelProgress`, `ProfileUpdate`
//! - **Posts**: `Post`, `Comment`, `Like`, `Share`
//! - **Friendships**: `Friendship`, `FriendshipStatus`, `FriendshipAction`
//! - **Notifications and messages**: `Notification`, `NotificationKind`, `Message`
//! - **Validation**: `Registration` and content checks
//!
//! # Levels
//!
//! Reaching the next level costs `level * 100` XP. Leveling up consumes that XP
//! and awards [`COINS_PER_LEVEL`] coins, so after any award `xp < level * 100`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod friendship;
pub mod ids;
pub mod message;
pub mod notification;
pub mod post;
pub mod session;
pub mod user;
pub mod validation;

pub use error::{Result, SocialError};
pub use friendship::{Friendship, FriendshipAction, FriendshipStatus};
pub use ids::{
    CommentId, IdError, MessageId, NotificationId, PostId, SessionId, ShareId, UserId,
};
pub use message::Message;
pub use notification::{Notification, NotificationKind};
pub use post::{Comment, Like, Post, Share, MAX_COMMENT_LENGTH, MAX_POST_LENGTH};
pub use session::Session;
pub use user::{
    LevelProgress, ProfileUpdate, User, COINS_PER_LEVEL, LIKE_XP_REWARD, XP_PER_LEVEL,
};
pub use validation::{
    validate_content, Registration, MAX_EMAIL_LENGTH, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH,
    MIN_USERNAME_LENGTH,
};
