//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    accounts, comments, friends, health, likes, messages, notifications, posts, users,
};
use crate::state::AppState;

/// Maximum concurrent requests across the API.
const MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /register` - Create an account
/// - `POST /login` - Get a session token
///
/// ## Auth optional
/// - `GET /` - Feed
/// - `GET /api/users/:username` - Public profile
/// - `GET /api/users/:username/posts` - A user's visible posts
/// - `GET /api/users/:username/shares` - A user's shares
/// - `GET /api/posts/:post_id` - A post
/// - `GET /api/posts/:post_id/comments` - A post's comments
/// - `GET /api/posts/:post_id/likes` - Who liked a post
///
/// ## Authenticated
/// - `GET|POST /logout` - Revoke the session
/// - `POST /create_post` - Create a post
/// - `POST /like/:post_id` - Toggle a like
/// - `POST /api/comment` - Comment on a post
/// - `DELETE /api/posts/:post_id` - Delete own post
/// - `POST /api/posts/:post_id/share` - Share a post
/// - `DELETE /api/comments/:comment_id` - Delete a comment
/// - `GET|PATCH /api/me` - Own profile
/// - `GET /api/notifications` - Notifications and unread count
/// - `POST /api/notifications/read_all` - Mark all read
/// - `POST /api/notifications/:id/read` - Mark one read
/// - `GET /api/friends` - Friends
/// - `GET /api/friends/requests` - Incoming requests
/// - `POST|DELETE /api/friends/:username` - Request / remove
/// - `POST /api/friends/:username/respond` - Accept or reject
/// - `POST /api/friends/:username/block` - Block
/// - `GET|POST /api/messages/:username` - Conversation / send
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    let api_routes = Router::new()
        // Profiles
        .route("/me", get(users::get_me).patch(users::update_me))
        .route("/users/:username", get(users::get_user))
        .route("/users/:username/posts", get(users::list_user_posts))
        .route("/users/:username/shares", get(users::list_user_shares))
        // Posts
        .route("/posts/:post_id", get(posts::get_post).delete(posts::delete_post))
        .route("/posts/:post_id/share", post(posts::share_post))
        .route("/posts/:post_id/likes", get(likes::list_likes))
        .route("/posts/:post_id/comments", get(comments::list_comments))
        // Comments
        .route("/comment", post(comments::add_comment))
        .route("/comments/:comment_id", delete(comments::delete_comment))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read_all", post(notifications::mark_all_read))
        .route("/notifications/:notification_id/read", post(notifications::mark_read))
        // Friends
        .route("/friends", get(friends::list_friends))
        .route("/friends/requests", get(friends::list_requests))
        .route(
            "/friends/:username",
            post(friends::send_request).delete(friends::remove),
        )
        .route("/friends/:username/respond", post(friends::respond))
        .route("/friends/:username/block", post(friends::block))
        // Messages
        .route(
            "/messages/:username",
            get(messages::conversation).post(messages::send_message),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/", get(posts::feed))
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/logout", get(accounts::logout).post(accounts::logout))
        .route("/create_post", post(posts::create_post))
        .route("/like/:post_id", post(likes::toggle_like))
        .nest("/api", api_routes)
        // Global middleware
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
