//! Results of compound operations.

use netta_core::LevelProgress;

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    /// Whether the post is liked after the toggle.
    pub liked: bool,
    /// The post's like counter after the toggle.
    pub likes_count: i64,
    /// XP awarded to the liker, `None` when the toggle removed a like.
    pub progress: Option<LevelProgress>,
}

/// Result of adding or deleting a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentOutcome {
    /// The post's comment counter afterwards.
    pub comments_count: i64,
}
