//! Netta Client SDK.
//!
//! A typed HTTP client for the Netta API.
//!
//! # Example
//!
//! ```rust,no_run
//! use netta_client::{NettaClient, NewPost, Page};
//!
//! # async fn example() -> Result<(), netta_client::ClientError> {
//! let mut client = NettaClient::new("http://localhost:5000")?;
//! client.login("alice", "netta123").await?;
//!
//! let post = client
//!     .create_post(&NewPost {
//!         content: "Hello, Netta!".to_string(),
//!         ..NewPost::default()
//!     })
//!     .await?;
//!
//! let like = client.toggle_like(&post.id).await?;
//! println!("liked: {}, level {}", like.liked, like.level);
//!
//! let feed = client.feed(Page::default()).await?;
//! println!("{} posts", feed.posts.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, NettaClient};
pub use error::ClientError;
pub use types::{
    AddedComment, Comment, Conversation, Feed, Friendship, FriendshipStatus, Health, Like,
    LikeToggle, LoginRequest, LoginResponse, MeResponse, Message, NewPost, Notification,
    NotificationKind, Notifications, Page, Post, Profile, ProfileResponse, ProfileUpdate,
    Registration, Share,
};
