//! Row types and their conversion into core types.
//!
//! Identifiers and enums are stored as TEXT; decoding them back can fail if the
//! database was edited by hand, which surfaces as `StoreError::Serialization`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use netta_core::{
    Comment, Friendship, FriendshipStatus, Like, Message, Notification, NotificationKind, Post,
    Session, Share, User,
};

use crate::error::{Result, StoreError};

fn parse<T>(column: &'static str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| StoreError::Serialization(format!("{column}: {e}")))
}

fn parse_opt<T>(column: &'static str, value: Option<&str>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map(|v| parse(column, v)).transpose()
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    full_name: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    location: Option<String>,
    level: i64,
    xp: i64,
    coins: i64,
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: parse("users.id", &row.id)?,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            bio: row.bio,
            avatar_url: row.avatar_url,
            location: row.location,
            level: row.level,
            xp: row.xp,
            coins: row.coins,
            created_at: row.created_at,
            last_seen: row.last_seen,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SessionRow {
    id: String,
    user_id: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = StoreError;

    fn try_from(row: SessionRow) -> Result<Self> {
        Ok(Self {
            id: parse("sessions.id", &row.id)?,
            user_id: parse("sessions.user_id", &row.user_id)?,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PostRow {
    id: String,
    author_id: String,
    content: String,
    image_url: Option<String>,
    is_private: bool,
    likes_count: i64,
    comments_count: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = StoreError;

    fn try_from(row: PostRow) -> Result<Self> {
        Ok(Self {
            id: parse("posts.id", &row.id)?,
            author_id: parse("posts.author_id", &row.author_id)?,
            content: row.content,
            image_url: row.image_url,
            is_private: row.is_private,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CommentRow {
    id: String,
    post_id: String,
    author_id: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = StoreError;

    fn try_from(row: CommentRow) -> Result<Self> {
        Ok(Self {
            id: parse("comments.id", &row.id)?,
            post_id: parse("comments.post_id", &row.post_id)?,
            author_id: parse("comments.author_id", &row.author_id)?,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ShareRow {
    id: String,
    user_id: String,
    post_id: Option<String>,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ShareRow> for Share {
    type Error = StoreError;

    fn try_from(row: ShareRow) -> Result<Self> {
        Ok(Self {
            id: parse("shares.id", &row.id)?,
            user_id: parse("shares.user_id", &row.user_id)?,
            post_id: parse_opt("shares.post_id", row.post_id.as_deref())?,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct FriendshipRow {
    user_id: String,
    friend_id: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FriendshipRow> for Friendship {
    type Error = StoreError;

    fn try_from(row: FriendshipRow) -> Result<Self> {
        Ok(Self {
            user_id: parse("friendships.user_id", &row.user_id)?,
            friend_id: parse("friendships.friend_id", &row.friend_id)?,
            status: parse::<FriendshipStatus>("friendships.status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct NotificationRow {
    id: String,
    user_id: String,
    kind: String,
    content: String,
    reference_id: Option<String>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = StoreError;

    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(Self {
            id: parse("notifications.id", &row.id)?,
            user_id: parse("notifications.user_id", &row.user_id)?,
            kind: parse::<NotificationKind>("notifications.kind", &row.kind)?,
            content: row.content,
            reference_id: row.reference_id,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MessageRow {
    id: String,
    sender_id: String,
    recipient_id: String,
    content: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Self {
            id: parse("messages.id", &row.id)?,
            sender_id: parse("messages.sender_id", &row.sender_id)?,
            recipient_id: parse("messages.recipient_id", &row.recipient_id)?,
            content: row.content,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct LikeRow {
    user_id: String,
    post_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<LikeRow> for Like {
    type Error = StoreError;

    fn try_from(row: LikeRow) -> Result<Self> {
        Ok(Self {
            user_id: parse("likes.user_id", &row.user_id)?,
            post_id: parse("likes.post_id", &row.post_id)?,
            created_at: row.created_at,
        })
    }
}

/// Convert a batch of rows, failing on the first bad one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}
