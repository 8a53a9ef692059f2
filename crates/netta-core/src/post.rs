//! Posts and the rows that hang off them.
//!
//! `likes_count` and `comments_count` are denormalized counters. The store keeps
//! them in sync with the child rows in the same transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::validate_content;
use crate::{CommentId, PostId, Result, ShareId, UserId};

/// Maximum post length in characters.
pub const MAX_POST_LENGTH: usize = 5000;

/// Maximum comment length in characters.
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// A post on a user's wall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// The post ID.
    pub id: PostId,

    /// Author of the post.
    pub author_id: UserId,

    /// Post body.
    pub content: String,

    /// Optional attached image link.
    pub image_url: Option<String>,

    /// Private posts are only shown to the author and accepted friends.
    pub is_private: bool,

    /// Number of likes.
    pub likes_count: i64,

    /// Number of comments.
    pub comments_count: i64,

    /// When the post was created.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is empty or longer than [`MAX_POST_LENGTH`].
    pub fn new(
        author_id: UserId,
        content: &str,
        image_url: Option<String>,
        is_private: bool,
    ) -> Result<Self> {
        let content = validate_content("post", content, MAX_POST_LENGTH)?;
        Ok(Self {
            id: PostId::generate(),
            author_id,
            content,
            image_url: image_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            is_private,
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now(),
        })
    }
}

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// The comment ID.
    pub id: CommentId,

    /// Post being commented on.
    pub post_id: PostId,

    /// Comment author.
    pub author_id: UserId,

    /// Comment body.
    pub content: String,

    /// When the comment was created.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is empty or longer than [`MAX_COMMENT_LENGTH`].
    pub fn new(post_id: PostId, author_id: UserId, content: &str) -> Result<Self> {
        let content = validate_content("comment", content, MAX_COMMENT_LENGTH)?;
        Ok(Self {
            id: CommentId::generate(),
            post_id,
            author_id,
            content,
            created_at: Utc::now(),
        })
    }
}

/// A like. At most one exists per (user, post) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    /// The user who liked.
    pub user_id: UserId,
    /// The liked post.
    pub post_id: PostId,
    /// When the like was created.
    pub created_at: DateTime<Utc>,
}

/// A re-share of a post.
///
/// Shares outlive the post they point at: deleting the post clears `post_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Share {
    /// The share ID.
    pub id: ShareId,

    /// The sharing user.
    pub user_id: UserId,

    /// The shared post, `None` once it has been deleted.
    pub post_id: Option<PostId>,

    /// Optional text added by the sharer.
    pub comment: Option<String>,

    /// When the share was created.
    pub created_at: DateTime<Utc>,
}

impl Share {
    /// Create a new share.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment is longer than [`MAX_COMMENT_LENGTH`].
    pub fn new(user_id: UserId, post_id: PostId, comment: Option<&str>) -> Result<Self> {
        let comment = match comment.map(str::trim).filter(|c| !c.is_empty()) {
            Some(text) => Some(validate_content("comment", text, MAX_COMMENT_LENGTH)?),
            None => None,
        };

        Ok(Self {
            id: ShareId::generate(),
            user_id,
            post_id: Some(post_id),
            comment,
            created_at: Utc::now(),
        })
    }
}
