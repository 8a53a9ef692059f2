//! Table names of the SQLite schema.
//!
//! The schema itself lives in `migrations/` and is embedded at build time.

/// Table names.
pub mod table {
    /// Registered users, unique on `username` and `email`.
    pub const USERS: &str = "users";

    /// Login sessions, cascade-deleted with their user.
    pub const SESSIONS: &str = "sessions";

    /// Posts with denormalized like and comment counters.
    pub const POSTS: &str = "posts";

    /// Likes, keyed by `(user_id, post_id)`, cascade-deleted with their post.
    pub const LIKES: &str = "likes";

    /// Comments, cascade-deleted with their post.
    pub const COMMENTS: &str = "comments";

    /// Shares; `post_id` is set to NULL when the post goes away.
    pub const SHARES: &str = "shares";

    /// Directed friendship edges, one per unordered pair.
    pub const FRIENDSHIPS: &str = "friendships";

    /// Notifications per recipient.
    pub const NOTIFICATIONS: &str = "notifications";

    /// Direct messages.
    pub const MESSAGES: &str = "messages";
}

/// Returns all table names, parents before children.
#[must_use]
pub fn all_tables() -> Vec<&'static str> {
    vec![
        table::USERS,
        table::SESSIONS,
        table::POSTS,
        table::LIKES,
        table::COMMENTS,
        table::SHARES,
        table::FRIENDSHIPS,
        table::NOTIFICATIONS,
        table::MESSAGES,
    ]
}
