//! Netta HTTP client implementation.

use reqwest::{Client, Method, RequestBuilder};
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    Ack, AddedComment, ApiErrorResponse, Comment, CommentRequest, CommentsCount,
    CommentsEnvelope, ContentRequest, Conversation, Feed, Friendship, FriendshipEnvelope, Health,
    Like, LikeToggle, LikesEnvelope, LoginRequest, LoginResponse, MeResponse, Message,
    MessageEnvelope, NewPost, Notifications, Page, Post, PostEnvelope, PostsEnvelope, Profile,
    ProfileResponse, ProfileUpdate, Registration, RespondRequest, Share, ShareEnvelope,
    ShareRequest, SharesEnvelope, Updated, UserEnvelope, UsersEnvelope,
};

/// Netta API client.
///
/// Holds at most one bearer token. [`NettaClient::login`] stores the token it
/// receives; calls that need a session fail with [`ClientError::NotLoggedIn`]
/// before touching the network when no token is set.
#[derive(Debug, Clone)]
pub struct NettaClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl NettaClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the Netta service (e.g., `"http://localhost:5000"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Use an existing bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace or clear the bearer token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// The current bearer token.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // ------------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------------

    /// Check service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn health(&self) -> Result<Health, ClientError> {
        let response = self.request(Method::GET, "/health").send().await?;
        Self::handle_response(response).await
    }

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Conflict`] when the username or email is taken.
    pub async fn register(&self, registration: &Registration) -> Result<Profile, ClientError> {
        let response = self
            .request(Method::POST, "/register")
            .json(registration)
            .send()
            .await?;

        let envelope: UserEnvelope = Self::handle_response(response).await?;
        Ok(envelope.user)
    }

    /// Log in and keep the returned token for later calls.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] on bad credentials.
    pub async fn login(
        &mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<LoginResponse, ClientError> {
        let request = LoginRequest {
            username: username.into(),
            password: password.into(),
        };

        let response = self
            .request(Method::POST, "/login")
            .json(&request)
            .send()
            .await?;

        let login: LoginResponse = Self::handle_response(response).await?;
        self.token = Some(login.token.clone());

        tracing::debug!(username = %login.user.username, "Logged in");
        Ok(login)
    }

    /// Revoke the current session and forget the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let response = self.authed(Method::POST, "/logout")?.send().await?;
        let _: Ack = Self::handle_response(response).await?;
        self.token = None;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------------

    /// Get your own profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn me(&self) -> Result<MeResponse, ClientError> {
        let response = self.authed(Method::GET, "/api/me")?.send().await?;
        Self::handle_response(response).await
    }

    /// Update your profile fields. `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<MeResponse, ClientError> {
        let response = self
            .authed(Method::PATCH, "/api/me")?
            .json(update)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Get a user's public profile.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for unknown users.
    pub async fn get_user(&self, username: &str) -> Result<ProfileResponse, ClientError> {
        let response = self
            .request(Method::GET, &format!("/api/users/{username}"))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// List a user's posts visible to you.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn user_posts(&self, username: &str, page: Page) -> Result<Vec<Post>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/api/users/{username}/posts"))
            .query(&page)
            .send()
            .await?;

        let envelope: PostsEnvelope = Self::handle_response(response).await?;
        Ok(envelope.posts)
    }

    /// List a user's shares.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn user_shares(
        &self,
        username: &str,
        page: Page,
    ) -> Result<Vec<Share>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/api/users/{username}/shares"))
            .query(&page)
            .send()
            .await?;

        let envelope: SharesEnvelope = Self::handle_response(response).await?;
        Ok(envelope.shares)
    }

    // ------------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------------

    /// Get the feed. Anonymous callers see public posts only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn feed(&self, page: Page) -> Result<Feed, ClientError> {
        let response = self.request(Method::GET, "/").query(&page).send().await?;
        Self::handle_response(response).await
    }

    /// Create a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ClientError> {
        let response = self
            .authed(Method::POST, "/create_post")?
            .json(post)
            .send()
            .await?;

        let envelope: PostEnvelope = Self::handle_response(response).await?;
        Ok(envelope.post)
    }

    /// Get a single post.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for missing posts and private posts
    /// you cannot see.
    pub async fn get_post(&self, post_id: &str) -> Result<Post, ClientError> {
        let response = self
            .request(Method::GET, &format!("/api/posts/{post_id}"))
            .send()
            .await?;

        let envelope: PostEnvelope = Self::handle_response(response).await?;
        Ok(envelope.post)
    }

    /// Delete one of your posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn delete_post(&self, post_id: &str) -> Result<(), ClientError> {
        let response = self
            .authed(Method::DELETE, &format!("/api/posts/{post_id}"))?
            .send()
            .await?;

        let _: Ack = Self::handle_response(response).await?;
        Ok(())
    }

    /// Like a post, or remove your like.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn toggle_like(&self, post_id: &str) -> Result<LikeToggle, ClientError> {
        let response = self
            .authed(Method::POST, &format!("/like/{post_id}"))?
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// List who liked a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_likes(&self, post_id: &str, page: Page) -> Result<Vec<Like>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/api/posts/{post_id}/likes"))
            .query(&page)
            .send()
            .await?;

        let envelope: LikesEnvelope = Self::handle_response(response).await?;
        Ok(envelope.likes)
    }

    /// Share a post with an optional comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn share_post(
        &self,
        post_id: &str,
        comment: Option<&str>,
    ) -> Result<Share, ClientError> {
        let response = self
            .authed(Method::POST, &format!("/api/posts/{post_id}/share"))?
            .json(&ShareRequest { comment })
            .send()
            .await?;

        let envelope: ShareEnvelope = Self::handle_response(response).await?;
        Ok(envelope.share)
    }

    // ------------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------------

    /// Comment on a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn add_comment(
        &self,
        post_id: &str,
        content: &str,
    ) -> Result<AddedComment, ClientError> {
        let response = self
            .authed(Method::POST, "/api/comment")?
            .json(&CommentRequest { post_id, content })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// List a post's comments, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_comments(
        &self,
        post_id: &str,
        page: Page,
    ) -> Result<Vec<Comment>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/api/posts/{post_id}/comments"))
            .query(&page)
            .send()
            .await?;

        let envelope: CommentsEnvelope = Self::handle_response(response).await?;
        Ok(envelope.comments)
    }

    /// Delete a comment and return the post's new comment count.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn delete_comment(&self, comment_id: &str) -> Result<i64, ClientError> {
        let response = self
            .authed(Method::DELETE, &format!("/api/comments/{comment_id}"))?
            .send()
            .await?;

        let count: CommentsCount = Self::handle_response(response).await?;
        Ok(count.comments_count)
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    /// List your notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn notifications(&self, page: Page) -> Result<Notifications, ClientError> {
        let response = self
            .authed(Method::GET, "/api/notifications")?
            .query(&page)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Mark one notification read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ClientError> {
        let response = self
            .authed(
                Method::POST,
                &format!("/api/notifications/{notification_id}/read"),
            )?
            .send()
            .await?;

        let _: Ack = Self::handle_response(response).await?;
        Ok(())
    }

    /// Mark all notifications read and return how many changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn mark_all_read(&self) -> Result<u64, ClientError> {
        let response = self
            .authed(Method::POST, "/api/notifications/read_all")?
            .send()
            .await?;

        let updated: Updated = Self::handle_response(response).await?;
        Ok(updated.updated)
    }

    // ------------------------------------------------------------------------
    // Friends
    // ------------------------------------------------------------------------

    /// List your accepted friends.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn friends(&self) -> Result<Vec<Profile>, ClientError> {
        let response = self.authed(Method::GET, "/api/friends")?.send().await?;
        let envelope: UsersEnvelope = Self::handle_response(response).await?;
        Ok(envelope.users)
    }

    /// List users waiting for your answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn friend_requests(&self) -> Result<Vec<Profile>, ClientError> {
        let response = self
            .authed(Method::GET, "/api/friends/requests")?
            .send()
            .await?;

        let envelope: UsersEnvelope = Self::handle_response(response).await?;
        Ok(envelope.users)
    }

    /// Send a friend request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Conflict`] when the pair's state does not allow it.
    pub async fn send_friend_request(&self, username: &str) -> Result<Friendship, ClientError> {
        self.friendship_call(Method::POST, &format!("/api/friends/{username}"), None)
            .await
    }

    /// Accept or reject a pending request from `username`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Conflict`] when there is nothing to answer.
    pub async fn respond_friend_request(
        &self,
        username: &str,
        accept: bool,
    ) -> Result<Friendship, ClientError> {
        self.friendship_call(
            Method::POST,
            &format!("/api/friends/{username}/respond"),
            Some(&RespondRequest { accept }),
        )
        .await
    }

    /// Block a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn block(&self, username: &str) -> Result<Friendship, ClientError> {
        self.friendship_call(Method::POST, &format!("/api/friends/{username}/block"), None)
            .await
    }

    /// Remove a friendship, cancel a request, or lift your block.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn remove_friend(&self, username: &str) -> Result<(), ClientError> {
        let response = self
            .authed(Method::DELETE, &format!("/api/friends/{username}"))?
            .send()
            .await?;

        let _: Ack = Self::handle_response(response).await?;
        Ok(())
    }

    async fn friendship_call(
        &self,
        method: Method,
        path: &str,
        body: Option<&RespondRequest>,
    ) -> Result<Friendship, ClientError> {
        let mut builder = self.authed(method, path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let envelope: FriendshipEnvelope = Self::handle_response(builder.send().await?).await?;
        Ok(envelope.friendship)
    }

    // ------------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------------

    /// Fetch your conversation with `username`, newest first.
    ///
    /// Fetching marks their messages to you as read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn conversation(
        &self,
        username: &str,
        page: Page,
    ) -> Result<Conversation, ClientError> {
        let response = self
            .authed(Method::GET, &format!("/api/messages/{username}"))?
            .query(&page)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Send a direct message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn send_message(&self, username: &str, content: &str) -> Result<Message, ClientError> {
        let response = self
            .authed(Method::POST, &format!("/api/messages/{username}"))?
            .json(&ContentRequest { content })
            .send()
            .await?;

        let envelope: MessageEnvelope = Self::handle_response(response).await?;
        Ok(envelope.message)
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    /// Build a request, attaching the token when one is set.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Build a request that requires a token.
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotLoggedIn)?;

        Ok(self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(token))
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let message = api_error.error.message;

                match api_error.error.code.as_str() {
                    "unauthorized" => Err(ClientError::Unauthorized),
                    "not_found" => Err(ClientError::NotFound(message)),
                    "conflict" => Err(ClientError::Conflict(message)),
                    code => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

impl ClientOptions {
    /// Options with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout_seconds: u64) -> Self {
        Self { timeout_seconds }
    }
}
