//! SQLite storage implementation.
//!
//! This module provides the `SqliteStore` implementation of the `Store` trait.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use netta_core::{
    Comment, CommentId, Friendship, FriendshipAction, FriendshipStatus, Like, Message,
    Notification, NotificationId, NotificationKind, Post, PostId, ProfileUpdate, Session,
    SessionId, Share, SocialError, User, UserId, LIKE_XP_REWARD,
};

use crate::error::{Result, StoreError};
use crate::rows::{
    convert_all, CommentRow, FriendshipRow, LikeRow, MessageRow, NotificationRow, PostRow,
    SessionRow, ShareRow, UserRow,
};
use crate::{CommentOutcome, LikeOutcome, Store};

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum pooled connections for file-backed databases.
const MAX_CONNECTIONS: u32 = 8;

/// Posts visible to a viewer: public ones, their own, and those of accepted friends.
/// Binds the viewer ID three times.
const VISIBLE_TO_VIEWER: &str = "(p.is_private = 0 \
     OR p.author_id = ? \
     OR EXISTS (SELECT 1 FROM friendships f \
                WHERE f.status = 'accepted' \
                  AND ((f.user_id = ? AND f.friend_id = p.author_id) \
                    OR (f.friend_id = ? AND f.user_id = p.author_id))))";

/// SQLite-backed storage implementation.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open or create the database at `url` and apply pending migrations.
    ///
    /// `sqlite::memory:` gives a private in-memory database held by a single
    /// connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn connect(url: &str) -> Result<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = if in_memory {
            // Every connection to `:memory:` is a separate database, so keep exactly one alive.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };

        let pool = pool_options.connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Open a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the migrations fail.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Wrap an existing pool and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the migrations fail.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!("Database migrations applied");
        Ok(Self { pool })
    }

    /// Close every pooled connection. Later queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("Database pool closed");
    }

    /// Open a transaction that takes the write lock up front.
    ///
    /// A deferred transaction that reads before writing cannot wait out a
    /// competing writer in WAL mode; SQLite fails the upgrade with
    /// `SQLITE_BUSY` instead of honouring `busy_timeout`.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn viewer_key(viewer: Option<&UserId>) -> String {
    viewer.map(ToString::to_string).unwrap_or_default()
}

// ============================================================================
// Connection-level helpers (usable inside transactions)
// ============================================================================

async fn fetch_user(conn: &mut SqliteConnection, user_id: &UserId) -> Result<Option<User>> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_optional(&mut *conn)
        .await?
        .map(User::try_from)
        .transpose()
}

async fn require_user(conn: &mut SqliteConnection, user_id: &UserId) -> Result<User> {
    fetch_user(conn, user_id)
        .await?
        .ok_or_else(|| StoreError::not_found("user", user_id))
}

async fn fetch_post(conn: &mut SqliteConnection, post_id: &PostId) -> Result<Option<Post>> {
    sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = ?")
        .bind(post_id.to_string())
        .fetch_optional(&mut *conn)
        .await?
        .map(Post::try_from)
        .transpose()
}

async fn require_post(conn: &mut SqliteConnection, post_id: &PostId) -> Result<Post> {
    fetch_post(conn, post_id)
        .await?
        .ok_or_else(|| StoreError::not_found("post", post_id))
}

async fn fetch_friendship(
    conn: &mut SqliteConnection,
    a: &UserId,
    b: &UserId,
) -> Result<Option<Friendship>> {
    let (a, b) = (a.to_string(), b.to_string());
    sqlx::query_as::<_, FriendshipRow>(
        "SELECT * FROM friendships \
         WHERE (user_id = ? AND friend_id = ?) OR (user_id = ? AND friend_id = ?)",
    )
    .bind(&a)
    .bind(&b)
    .bind(&b)
    .bind(&a)
    .fetch_optional(&mut *conn)
    .await?
    .map(Friendship::try_from)
    .transpose()
}

async fn save_progress(conn: &mut SqliteConnection, user: &User) -> Result<()> {
    sqlx::query("UPDATE users SET level = ?, xp = ?, coins = ? WHERE id = ?")
        .bind(user.level)
        .bind(user.xp)
        .bind(user.coins)
        .bind(user.id.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_notification(
    conn: &mut SqliteConnection,
    notification: Option<Notification>,
) -> Result<()> {
    let Some(notification) = notification else {
        return Ok(());
    };

    sqlx::query(
        "INSERT INTO notifications (id, user_id, kind, content, reference_id, is_read, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(notification.id.to_string())
    .bind(notification.user_id.to_string())
    .bind(notification.kind.as_str())
    .bind(&notification.content)
    .bind(&notification.reference_id)
    .bind(notification.is_read)
    .bind(notification.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut tx = self.begin_write().await?;

        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = ?)")
                .bind(&user.username)
                .fetch_one(&mut *tx)
                .await?;
        if username_taken {
            return Err(StoreError::UsernameTaken);
        }

        let email_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?)")
                .bind(&user.email)
                .fetch_one(&mut *tx)
                .await?;
        if email_taken {
            return Err(StoreError::EmailTaken);
        }

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, full_name, bio, avatar_url, \
             location, level, xp, coins, created_at, last_seen) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .bind(&user.location)
        .bind(user.level)
        .bind(user.xp)
        .bind(user.coins)
        .bind(user.created_at)
        .bind(user.last_seen)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, user_id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User> {
        let mut tx = self.begin_write().await?;
        let mut user = require_user(&mut tx, user_id).await?;
        user.apply_profile(update);

        sqlx::query(
            "UPDATE users SET full_name = ?, bio = ?, avatar_url = ?, location = ? WHERE id = ?",
        )
        .bind(&user.full_name)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .bind(&user.location)
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn touch_last_seen(&self, user_id: &UserId) -> Result<()> {
        sqlx::query("UPDATE users SET last_seen = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    async fn create_session(&self, session: &Session) -> Result<()> {
        sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(session.id.to_string())
            .bind(session.user_id.to_string())
            .bind(session.created_at)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_session(&self, session_id: &SessionId) -> Result<Option<Session>> {
        sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Session::try_from)
            .transpose()
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    // =========================================================================
    // Post Operations
    // =========================================================================

    async fn create_post(&self, post: &Post) -> Result<()> {
        let mut tx = self.begin_write().await?;
        require_user(&mut tx, &post.author_id).await?;

        sqlx::query(
            "INSERT INTO posts (id, author_id, content, image_url, is_private, likes_count, \
             comments_count, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(post.id.to_string())
        .bind(post.author_id.to_string())
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(post.is_private)
        .bind(post.likes_count)
        .bind(post.comments_count)
        .bind(post.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_post(&self, post_id: &PostId) -> Result<Option<Post>> {
        let mut conn = self.pool.acquire().await?;
        fetch_post(&mut conn, post_id).await
    }

    async fn delete_post(&self, post_id: &PostId, actor: &UserId) -> Result<()> {
        let mut tx = self.begin_write().await?;
        let post = require_post(&mut tx, post_id).await?;

        if post.author_id != *actor {
            return Err(StoreError::Forbidden(
                "only the author can delete a post".into(),
            ));
        }

        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_posts_by_author(
        &self,
        author_id: &UserId,
        viewer: Option<&UserId>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Post>> {
        let viewer = viewer_key(viewer);
        let sql = format!(
            "SELECT p.* FROM posts p WHERE p.author_id = ? AND {VISIBLE_TO_VIEWER} \
             ORDER BY p.created_at DESC, p.rowid DESC LIMIT ? OFFSET ?"
        );

        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(author_id.to_string())
            .bind(&viewer)
            .bind(&viewer)
            .bind(&viewer)
            .bind(to_i64(limit))
            .bind(to_i64(offset))
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn feed(
        &self,
        viewer: Option<&UserId>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Post>> {
        let viewer = viewer_key(viewer);
        let sql = format!(
            "SELECT p.* FROM posts p WHERE {VISIBLE_TO_VIEWER} \
             ORDER BY p.created_at DESC, p.rowid DESC LIMIT ? OFFSET ?"
        );

        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&viewer)
            .bind(&viewer)
            .bind(&viewer)
            .bind(to_i64(limit))
            .bind(to_i64(offset))
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    // =========================================================================
    // Like Operations
    // =========================================================================

    async fn toggle_like(&self, user_id: &UserId, post_id: &PostId) -> Result<LikeOutcome> {
        let mut tx = self.begin_write().await?;
        let post = require_post(&mut tx, post_id).await?;
        let mut liker = require_user(&mut tx, user_id).await?;

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
            .bind(user_id.to_string())
            .bind(post_id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        let outcome = if removed {
            let likes_count: i64 = sqlx::query_scalar(
                "UPDATE posts SET likes_count = MAX(likes_count - 1, 0) WHERE id = ? \
                 RETURNING likes_count",
            )
            .bind(post_id.to_string())
            .fetch_one(&mut *tx)
            .await?;

            LikeOutcome {
                liked: false,
                likes_count,
                progress: None,
            }
        } else {
            sqlx::query("INSERT INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)")
                .bind(user_id.to_string())
                .bind(post_id.to_string())
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;

            let likes_count: i64 = sqlx::query_scalar(
                "UPDATE posts SET likes_count = likes_count + 1 WHERE id = ? \
                 RETURNING likes_count",
            )
            .bind(post_id.to_string())
            .fetch_one(&mut *tx)
            .await?;

            let progress = liker.add_xp(LIKE_XP_REWARD);
            save_progress(&mut tx, &liker).await?;

            let notification = Notification::for_action(
                post.author_id,
                liker.id,
                NotificationKind::Like,
                format!("{} liked your post", liker.username),
                Some(post_id.to_string()),
            );
            insert_notification(&mut tx, notification).await?;

            LikeOutcome {
                liked: true,
                likes_count,
                progress: Some(progress),
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn has_liked(&self, user_id: &UserId, post_id: &PostId) -> Result<bool> {
        let liked = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE user_id = ? AND post_id = ?)",
        )
        .bind(user_id.to_string())
        .bind(post_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(liked)
    }

    async fn list_likes(
        &self,
        post_id: &PostId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Like>> {
        let rows = sqlx::query_as::<_, LikeRow>(
            "SELECT * FROM likes WHERE post_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(post_id.to_string())
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    // =========================================================================
    // Comment Operations
    // =========================================================================

    async fn add_comment(&self, comment: &Comment) -> Result<CommentOutcome> {
        let mut tx = self.begin_write().await?;
        let post = require_post(&mut tx, &comment.post_id).await?;
        let author = require_user(&mut tx, &comment.author_id).await?;

        sqlx::query(
            "INSERT INTO comments (id, post_id, author_id, content, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(comment.id.to_string())
        .bind(comment.post_id.to_string())
        .bind(comment.author_id.to_string())
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&mut *tx)
        .await?;

        let comments_count: i64 = sqlx::query_scalar(
            "UPDATE posts SET comments_count = comments_count + 1 WHERE id = ? \
             RETURNING comments_count",
        )
        .bind(comment.post_id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        let notification = Notification::for_action(
            post.author_id,
            author.id,
            NotificationKind::Comment,
            format!("{} commented on your post", author.username),
            Some(post.id.to_string()),
        );
        insert_notification(&mut tx, notification).await?;

        tx.commit().await?;
        Ok(CommentOutcome { comments_count })
    }

    async fn list_comments(
        &self,
        post_id: &PostId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT * FROM comments WHERE post_id = ? \
             ORDER BY created_at ASC, rowid ASC LIMIT ? OFFSET ?",
        )
        .bind(post_id.to_string())
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn delete_comment(
        &self,
        comment_id: &CommentId,
        actor: &UserId,
    ) -> Result<CommentOutcome> {
        let mut tx = self.begin_write().await?;

        let comment: Comment = sqlx::query_as::<_, CommentRow>("SELECT * FROM comments WHERE id = ?")
            .bind(comment_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("comment", comment_id))?
            .try_into()?;
        let post = require_post(&mut tx, &comment.post_id).await?;

        if comment.author_id != *actor && post.author_id != *actor {
            return Err(StoreError::Forbidden(
                "only the comment or post author can delete a comment".into(),
            ));
        }

        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id.to_string())
            .execute(&mut *tx)
            .await?;

        let comments_count: i64 = sqlx::query_scalar(
            "UPDATE posts SET comments_count = MAX(comments_count - 1, 0) WHERE id = ? \
             RETURNING comments_count",
        )
        .bind(post.id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(CommentOutcome { comments_count })
    }

    // =========================================================================
    // Share Operations
    // =========================================================================

    async fn share_post(&self, share: &Share) -> Result<()> {
        let post_id = share
            .post_id
            .ok_or_else(|| StoreError::not_found("post", "none"))?;

        let mut tx = self.begin_write().await?;
        require_post(&mut tx, &post_id).await?;

        sqlx::query(
            "INSERT INTO shares (id, user_id, post_id, comment, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(share.id.to_string())
        .bind(share.user_id.to_string())
        .bind(post_id.to_string())
        .bind(&share.comment)
        .bind(share.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_shares_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Share>> {
        let rows = sqlx::query_as::<_, ShareRow>(
            "SELECT * FROM shares WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id.to_string())
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    // =========================================================================
    // Friendship Operations
    // =========================================================================

    async fn get_friendship(&self, a: &UserId, b: &UserId) -> Result<Option<Friendship>> {
        let mut conn = self.pool.acquire().await?;
        fetch_friendship(&mut conn, a, b).await
    }

    async fn friendship_action(
        &self,
        actor: &UserId,
        other: &UserId,
        action: FriendshipAction,
    ) -> Result<Friendship> {
        if actor == other {
            let action = if action == FriendshipAction::Block {
                "block"
            } else {
                "befriend"
            };
            return Err(SocialError::SelfAction { action }.into());
        }

        let mut tx = self.begin_write().await?;
        let actor_user = require_user(&mut tx, actor).await?;
        require_user(&mut tx, other).await?;

        let existing = fetch_friendship(&mut tx, actor, other).await?;
        let previous = existing.as_ref().map(|edge| (edge.user_id, edge.friend_id, edge.status));

        let edge = match existing {
            Some(mut edge) => {
                edge.transition(*actor, action)?;
                edge
            }
            None => match action {
                FriendshipAction::Request => Friendship::request(*actor, *other)?,
                FriendshipAction::Block => Friendship::block(*actor, *other)?,
                FriendshipAction::Accept | FriendshipAction::Reject => {
                    return Err(SocialError::InvalidTransition { from: None, action }.into());
                }
            },
        };

        match previous {
            Some((old_user, old_friend, _)) => {
                sqlx::query(
                    "UPDATE friendships SET user_id = ?, friend_id = ?, status = ?, updated_at = ? \
                     WHERE user_id = ? AND friend_id = ?",
                )
                .bind(edge.user_id.to_string())
                .bind(edge.friend_id.to_string())
                .bind(edge.status.as_str())
                .bind(edge.updated_at)
                .bind(old_user.to_string())
                .bind(old_friend.to_string())
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO friendships (user_id, friend_id, status, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(edge.user_id.to_string())
                .bind(edge.friend_id.to_string())
                .bind(edge.status.as_str())
                .bind(edge.created_at)
                .bind(edge.updated_at)
                .execute(&mut *tx)
                .await?;
            }
        }

        let previous_status = previous.map(|(_, _, status)| status);
        let notification = match edge.status {
            FriendshipStatus::Pending if previous_status != Some(FriendshipStatus::Pending) => {
                Notification::for_action(
                    edge.other(*actor),
                    *actor,
                    NotificationKind::FriendRequest,
                    format!("{} sent you a friend request", actor_user.username),
                    Some(actor.to_string()),
                )
            }
            FriendshipStatus::Accepted if previous_status != Some(FriendshipStatus::Accepted) => {
                Notification::for_action(
                    edge.other(*actor),
                    *actor,
                    NotificationKind::FriendAccepted,
                    format!("{} accepted your friend request", actor_user.username),
                    Some(actor.to_string()),
                )
            }
            _ => None,
        };
        insert_notification(&mut tx, notification).await?;

        tx.commit().await?;
        Ok(edge)
    }

    async fn remove_friendship(&self, actor: &UserId, other: &UserId) -> Result<()> {
        let mut tx = self.begin_write().await?;
        let edge = fetch_friendship(&mut tx, actor, other)
            .await?
            .ok_or_else(|| StoreError::not_found("friendship", other))?;
        edge.ensure_removable_by(*actor)?;

        sqlx::query("DELETE FROM friendships WHERE user_id = ? AND friend_id = ?")
            .bind(edge.user_id.to_string())
            .bind(edge.friend_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_friends(&self, user_id: &UserId) -> Result<Vec<User>> {
        let id = user_id.to_string();
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT u.* FROM users u JOIN friendships f \
               ON (f.user_id = ? AND f.friend_id = u.id) OR (f.friend_id = ? AND f.user_id = u.id) \
             WHERE f.status = 'accepted' \
             ORDER BY u.username",
        )
        .bind(&id)
        .bind(&id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn list_friend_requests(&self, user_id: &UserId) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT u.* FROM users u JOIN friendships f ON f.user_id = u.id \
             WHERE f.friend_id = ? AND f.status = 'pending' \
             ORDER BY f.updated_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    // =========================================================================
    // Notification Operations
    // =========================================================================

    async fn list_notifications(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notifications WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id.to_string())
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn unread_notification_count(&self, user_id: &UserId) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn mark_notification_read(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<()> {
        let updated = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
            .bind(notification_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(StoreError::not_found("notification", notification_id));
        }
        Ok(())
    }

    async fn mark_all_notifications_read(&self, user_id: &UserId) -> Result<u64> {
        let updated =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await?
                .rows_affected();
        Ok(updated)
    }

    // =========================================================================
    // Message Operations
    // =========================================================================

    async fn send_message(&self, message: &Message) -> Result<()> {
        let mut tx = self.begin_write().await?;
        let sender = require_user(&mut tx, &message.sender_id).await?;
        require_user(&mut tx, &message.recipient_id).await?;

        sqlx::query(
            "INSERT INTO messages (id, sender_id, recipient_id, content, is_read, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.sender_id.to_string())
        .bind(message.recipient_id.to_string())
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        let notification = Notification::for_action(
            message.recipient_id,
            message.sender_id,
            NotificationKind::Message,
            format!("{} sent you a message", sender.username),
            Some(message.id.to_string()),
        );
        insert_notification(&mut tx, notification).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn conversation(
        &self,
        a: &UserId,
        b: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>> {
        let (a, b) = (a.to_string(), b.to_string());
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT * FROM messages \
             WHERE (sender_id = ? AND recipient_id = ?) OR (sender_id = ? AND recipient_id = ?) \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(&a)
        .bind(&b)
        .bind(&b)
        .bind(&a)
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn mark_conversation_read(&self, reader: &UserId, other: &UserId) -> Result<u64> {
        let updated = sqlx::query(
            "UPDATE messages SET is_read = 1 \
             WHERE sender_id = ? AND recipient_id = ? AND is_read = 0",
        )
        .bind(other.to_string())
        .bind(reader.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::all_tables;

    async fn store() -> SqliteStore {
        SqliteStore::in_memory().await.unwrap()
    }

    async fn user(store: &SqliteStore, name: &str) -> User {
        let user = User::new(name.into(), format!("{name}@example.com"), "hash".into());
        store.create_user(&user).await.unwrap();
        user
    }

    async fn post(store: &SqliteStore, author: &User, private: bool) -> Post {
        let post = Post::new(author.id, "hello world", None, private).unwrap();
        store.create_post(&post).await.unwrap();
        post
    }

    async fn befriend(store: &SqliteStore, a: &User, b: &User) {
        store
            .friendship_action(&a.id, &b.id, FriendshipAction::Request)
            .await
            .unwrap();
        store
            .friendship_action(&b.id, &a.id, FriendshipAction::Accept)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn migrations_create_every_table() {
        let store = store().await;
        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
                .fetch_all(&store.pool)
                .await
                .unwrap();

        for table in all_tables() {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
    }

    #[tokio::test]
    async fn file_database_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("netta.db").display());

        let alice = {
            let store = SqliteStore::connect(&url).await.unwrap();
            user(&store, "alice").await
        };

        let store = SqliteStore::connect(&url).await.unwrap();
        let loaded = store.get_user(&alice.id).await.unwrap().unwrap();
        assert_eq!(loaded.username, "alice");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_likes_on_file_database_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("netta.db").display());
        let store = SqliteStore::connect(&url).await.unwrap();

        let author = user(&store, "author").await;
        let post = post(&store, &author, false).await;
        let mut likers = Vec::new();
        for i in 0..16 {
            likers.push(user(&store, &format!("liker{i}")).await);
        }

        let handles: Vec<_> = likers
            .iter()
            .map(|liker| {
                let store = store.clone();
                let liker_id = liker.id;
                let post_id = post.id;
                tokio::spawn(async move { store.toggle_like(&liker_id, &post_id).await })
            })
            .collect();

        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert!(outcome.liked);
        }

        let stored = store.get_post(&post.id).await.unwrap().unwrap();
        assert_eq!(stored.likes_count, 16);
        let likes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = ?")
            .bind(post.id.to_string())
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(likes, 16);
    }

    #[tokio::test]
    async fn ping_reaches_database() {
        let store = store().await;
        store.ping().await.unwrap();

        store.close().await;
        assert!(store.ping().await.is_err());
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_rejected() {
        let store = store().await;
        user(&store, "alice").await;

        let same_name = User::new("ALICE".into(), "other@example.com".into(), "hash".into());
        assert!(matches!(
            store.create_user(&same_name).await,
            Err(StoreError::UsernameTaken)
        ));

        let same_email = User::new("bob".into(), "alice@example.com".into(), "hash".into());
        assert!(matches!(
            store.create_user(&same_email).await,
            Err(StoreError::EmailTaken)
        ));

        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn username_lookup_ignores_case() {
        let store = store().await;
        let alice = user(&store, "alice").await;

        let found = store.get_user_by_username("Alice").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert!(store.get_user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn toggling_a_like_twice_restores_the_count() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let post = post(&store, &alice, false).await;

        let first = store.toggle_like(&bob.id, &post.id).await.unwrap();
        assert!(first.liked);
        assert_eq!(first.likes_count, 1);
        assert!(store.has_liked(&bob.id, &post.id).await.unwrap());

        let second = store.toggle_like(&bob.id, &post.id).await.unwrap();
        assert!(!second.liked);
        assert_eq!(second.likes_count, 0);
        assert!(second.progress.is_none());
        assert!(!store.has_liked(&bob.id, &post.id).await.unwrap());

        let stored = store.get_post(&post.id).await.unwrap().unwrap();
        assert_eq!(stored.likes_count, 0);
    }

    #[tokio::test]
    async fn like_count_never_goes_negative() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let post = post(&store, &alice, false).await;

        store.toggle_like(&alice.id, &post.id).await.unwrap();
        sqlx::query("UPDATE posts SET likes_count = 0 WHERE id = ?")
            .bind(post.id.to_string())
            .execute(&store.pool)
            .await
            .unwrap();

        let outcome = store.toggle_like(&alice.id, &post.id).await.unwrap();
        assert!(!outcome.liked);
        assert_eq!(outcome.likes_count, 0);
    }

    #[tokio::test]
    async fn twenty_likes_level_up_the_liker() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;

        let mut last = None;
        for _ in 0..20 {
            let post = post(&store, &alice, false).await;
            last = store.toggle_like(&bob.id, &post.id).await.unwrap().progress;
        }

        let progress = last.unwrap();
        assert!(progress.leveled_up());

        let bob = store.get_user(&bob.id).await.unwrap().unwrap();
        assert_eq!(bob.level, 2);
        assert_eq!(bob.xp, 0);
        assert_eq!(bob.coins, 50);
    }

    #[tokio::test]
    async fn unliking_keeps_earned_xp() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let post = post(&store, &alice, false).await;

        store.toggle_like(&bob.id, &post.id).await.unwrap();
        store.toggle_like(&bob.id, &post.id).await.unwrap();

        let bob = store.get_user(&bob.id).await.unwrap().unwrap();
        assert_eq!(bob.xp, i64::from(LIKE_XP_REWARD));
    }

    #[tokio::test]
    async fn likes_notify_the_author_but_not_self() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let post = post(&store, &alice, false).await;

        store.toggle_like(&alice.id, &post.id).await.unwrap();
        assert_eq!(store.unread_notification_count(&alice.id).await.unwrap(), 0);

        store.toggle_like(&bob.id, &post.id).await.unwrap();
        let notifications = store.list_notifications(&alice.id, 10, 0).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Like);
        assert_eq!(notifications[0].content, "bob liked your post");
        assert_eq!(notifications[0].reference_id, Some(post.id.to_string()));
    }

    #[tokio::test]
    async fn liking_a_missing_post_fails() {
        let store = store().await;
        let alice = user(&store, "alice").await;

        let result = store.toggle_like(&alice.id, &PostId::generate()).await;
        assert!(matches!(result, Err(StoreError::NotFound { entity: "post", .. })));
    }

    #[tokio::test]
    async fn comments_update_the_counter() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let post = post(&store, &alice, false).await;

        let first = Comment::new(post.id, bob.id, "first").unwrap();
        let second = Comment::new(post.id, alice.id, "second").unwrap();
        assert_eq!(store.add_comment(&first).await.unwrap().comments_count, 1);
        assert_eq!(store.add_comment(&second).await.unwrap().comments_count, 2);

        let comments = store.list_comments(&post.id, 10, 0).await.unwrap();
        let contents: Vec<_> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);

        // Only bob's comment notifies alice.
        assert_eq!(store.unread_notification_count(&alice.id).await.unwrap(), 1);

        let outcome = store.delete_comment(&first.id, &alice.id).await.unwrap();
        assert_eq!(outcome.comments_count, 1);
    }

    #[tokio::test]
    async fn strangers_cannot_delete_comments() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let carol = user(&store, "carol").await;
        let post = post(&store, &alice, false).await;

        let comment = Comment::new(post.id, bob.id, "mine").unwrap();
        store.add_comment(&comment).await.unwrap();

        assert!(matches!(
            store.delete_comment(&comment.id, &carol.id).await,
            Err(StoreError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn deleting_a_post_cascades_but_keeps_shares() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let post = post(&store, &alice, false).await;

        store.toggle_like(&bob.id, &post.id).await.unwrap();
        store
            .add_comment(&Comment::new(post.id, bob.id, "nice").unwrap())
            .await
            .unwrap();
        let share = Share::new(bob.id, post.id, Some("look")).unwrap();
        store.share_post(&share).await.unwrap();

        assert!(matches!(
            store.delete_post(&post.id, &bob.id).await,
            Err(StoreError::Forbidden(_))
        ));
        store.delete_post(&post.id, &alice.id).await.unwrap();

        assert!(store.get_post(&post.id).await.unwrap().is_none());
        assert!(store.list_likes(&post.id, 10, 0).await.unwrap().is_empty());
        assert!(store.list_comments(&post.id, 10, 0).await.unwrap().is_empty());

        let shares = store.list_shares_by_user(&bob.id, 10, 0).await.unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].post_id, None);
        assert_eq!(shares[0].comment.as_deref(), Some("look"));
    }

    #[tokio::test]
    async fn feed_hides_private_posts_from_strangers() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let carol = user(&store, "carol").await;
        let public = post(&store, &alice, false).await;
        let private = post(&store, &alice, true).await;
        befriend(&store, &alice, &bob).await;

        let ids = |posts: Vec<Post>| posts.into_iter().map(|p| p.id).collect::<Vec<_>>();

        assert_eq!(ids(store.feed(None, 10, 0).await.unwrap()), [public.id]);
        assert_eq!(ids(store.feed(Some(&carol.id), 10, 0).await.unwrap()), [public.id]);
        assert_eq!(
            ids(store.feed(Some(&bob.id), 10, 0).await.unwrap()),
            [private.id, public.id]
        );
        assert_eq!(
            ids(store
                .list_posts_by_author(&alice.id, Some(&alice.id), 10, 0)
                .await
                .unwrap()),
            [private.id, public.id]
        );
    }

    #[tokio::test]
    async fn feed_pages_newest_first() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let mut created = Vec::new();
        for _ in 0..5 {
            created.push(post(&store, &alice, false).await.id);
        }
        created.reverse();

        let first: Vec<_> = store.feed(None, 2, 0).await.unwrap().into_iter().map(|p| p.id).collect();
        let rest: Vec<_> = store.feed(None, 10, 2).await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(first, created[..2]);
        assert_eq!(rest, created[2..]);
    }

    #[tokio::test]
    async fn friendship_is_symmetric() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;

        let pending = store
            .friendship_action(&alice.id, &bob.id, FriendshipAction::Request)
            .await
            .unwrap();
        assert_eq!(pending.status, FriendshipStatus::Pending);

        let requests = store.list_friend_requests(&bob.id).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, alice.id);
        assert!(store.list_friend_requests(&alice.id).await.unwrap().is_empty());

        store
            .friendship_action(&bob.id, &alice.id, FriendshipAction::Accept)
            .await
            .unwrap();

        let from_alice = store.get_friendship(&alice.id, &bob.id).await.unwrap().unwrap();
        let from_bob = store.get_friendship(&bob.id, &alice.id).await.unwrap().unwrap();
        assert_eq!(from_alice, from_bob);
        assert_eq!(from_alice.status, FriendshipStatus::Accepted);

        assert_eq!(store.list_friends(&alice.id).await.unwrap()[0].id, bob.id);
        assert_eq!(store.list_friends(&bob.id).await.unwrap()[0].id, alice.id);

        let kinds: Vec<_> = store
            .list_notifications(&alice.id, 10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(kinds, [NotificationKind::FriendAccepted]);
    }

    #[tokio::test]
    async fn mutual_requests_become_friends() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;

        store
            .friendship_action(&alice.id, &bob.id, FriendshipAction::Request)
            .await
            .unwrap();
        let edge = store
            .friendship_action(&bob.id, &alice.id, FriendshipAction::Request)
            .await
            .unwrap();
        assert_eq!(edge.status, FriendshipStatus::Accepted);
    }

    #[tokio::test]
    async fn self_friendship_is_rejected() {
        let store = store().await;
        let alice = user(&store, "alice").await;

        let result = store
            .friendship_action(&alice.id, &alice.id, FriendshipAction::Request)
            .await;
        assert!(matches!(
            result,
            Err(StoreError::Domain(SocialError::SelfAction { .. }))
        ));
    }

    #[tokio::test]
    async fn blocked_users_cannot_request_until_unblocked() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;

        store
            .friendship_action(&alice.id, &bob.id, FriendshipAction::Block)
            .await
            .unwrap();
        assert!(store
            .friendship_action(&bob.id, &alice.id, FriendshipAction::Request)
            .await
            .is_err());
        assert!(store.remove_friendship(&bob.id, &alice.id).await.is_err());

        store.remove_friendship(&alice.id, &bob.id).await.unwrap();
        assert!(store.get_friendship(&alice.id, &bob.id).await.unwrap().is_none());

        store
            .friendship_action(&bob.id, &alice.id, FriendshipAction::Request)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn notifications_can_be_marked_read() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let first = post(&store, &alice, false).await;
        let second = post(&store, &alice, false).await;
        store.toggle_like(&bob.id, &first.id).await.unwrap();
        store.toggle_like(&bob.id, &second.id).await.unwrap();

        let notifications = store.list_notifications(&alice.id, 10, 0).await.unwrap();
        assert_eq!(notifications[0].reference_id, Some(second.id.to_string()));

        assert!(matches!(
            store.mark_notification_read(&bob.id, &notifications[0].id).await,
            Err(StoreError::NotFound { .. })
        ));
        store
            .mark_notification_read(&alice.id, &notifications[0].id)
            .await
            .unwrap();
        assert_eq!(store.unread_notification_count(&alice.id).await.unwrap(), 1);

        assert_eq!(store.mark_all_notifications_read(&alice.id).await.unwrap(), 1);
        assert_eq!(store.unread_notification_count(&alice.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn conversation_collects_both_directions() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;

        let hello = Message::new(alice.id, bob.id, "hi bob").unwrap();
        let reply = Message::new(bob.id, alice.id, "hi alice").unwrap();
        store.send_message(&hello).await.unwrap();
        store.send_message(&reply).await.unwrap();

        let thread = store.conversation(&alice.id, &bob.id, 10, 0).await.unwrap();
        let ids: Vec<_> = thread.iter().map(|m| m.id).collect();
        assert_eq!(ids, [reply.id, hello.id]);

        assert_eq!(store.mark_conversation_read(&bob.id, &alice.id).await.unwrap(), 1);
        assert_eq!(store.mark_conversation_read(&bob.id, &alice.id).await.unwrap(), 0);

        let kinds: Vec<_> = store
            .list_notifications(&bob.id, 10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(kinds, [NotificationKind::Message]);
    }

    #[tokio::test]
    async fn sessions_can_be_revoked() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let session = Session::new(alice.id, chrono::Duration::hours(1));
        store.create_session(&session).await.unwrap();

        assert_eq!(store.get_session(&session.id).await.unwrap(), Some(session.clone()));
        assert!(store.delete_session(&session.id).await.unwrap());
        assert!(!store.delete_session(&session.id).await.unwrap());
        assert!(store.get_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_update_persists() {
        let store = store().await;
        let alice = user(&store, "alice").await;

        let update = ProfileUpdate {
            bio: Some("  hello  ".into()),
            ..ProfileUpdate::default()
        };
        let updated = store.update_profile(&alice.id, update).await.unwrap();
        assert_eq!(updated.bio.as_deref(), Some("hello"));

        let loaded = store.get_user(&alice.id).await.unwrap().unwrap();
        assert_eq!(loaded.bio.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn touching_refreshes_last_seen() {
        let store = store().await;
        let mut carol = User::new("carol".into(), "carol@example.com".into(), "hash".into());
        carol.last_seen = Utc::now() - chrono::Duration::days(1);
        store.create_user(&carol).await.unwrap();

        store.touch_last_seen(&carol.id).await.unwrap();

        let loaded = store.get_user(&carol.id).await.unwrap().unwrap();
        assert!(loaded.last_seen > carol.last_seen);
    }
}
