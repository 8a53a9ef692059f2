//! Post and feed handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use netta_core::{Post, PostId, Share, UserId};
use netta_store::Store;

use super::users::ShareView;
use super::{success, visible_post, Empty, Page, Success, Usernames};
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// A post as returned by the API.
#[derive(Debug, Serialize)]
pub struct PostView {
    /// Post ID.
    pub id: String,
    /// Author ID.
    pub author_id: String,
    /// Author username.
    pub author_username: String,
    /// Text content.
    pub content: String,
    /// Attached image URL.
    pub image_url: Option<String>,
    /// Visible to friends only.
    pub is_private: bool,
    /// Number of likes.
    pub likes_count: i64,
    /// Number of comments.
    pub comments_count: i64,
    /// Whether the viewer has liked it.
    pub liked: bool,
    /// Created timestamp.
    pub created_at: String,
}

impl PostView {
    fn new(post: &Post, author_username: String, liked: bool) -> Self {
        Self {
            id: post.id.to_string(),
            author_id: post.author_id.to_string(),
            author_username,
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            is_private: post.is_private,
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            liked,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Render one post for `viewer`.
pub(crate) async fn post_view(
    store: &dyn Store,
    post: &Post,
    viewer: Option<&UserId>,
) -> Result<PostView, ApiError> {
    let mut names = Usernames::new(store);
    render(store, &mut names, post, viewer).await
}

/// Render a list of posts for `viewer`, looking each author up once.
pub(crate) async fn post_views(
    store: &dyn Store,
    posts: Vec<Post>,
    viewer: Option<&UserId>,
) -> Result<Vec<PostView>, ApiError> {
    let mut names = Usernames::new(store);
    let mut views = Vec::with_capacity(posts.len());
    for post in &posts {
        views.push(render(store, &mut names, post, viewer).await?);
    }
    Ok(views)
}

async fn render(
    store: &dyn Store,
    names: &mut Usernames<'_>,
    post: &Post,
    viewer: Option<&UserId>,
) -> Result<PostView, ApiError> {
    let author = names.get(post.author_id).await?;
    let liked = match viewer {
        Some(viewer) => store.has_liked(viewer, &post.id).await?,
        None => false,
    };
    Ok(PostView::new(post, author, liked))
}

/// Feed response.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    /// Posts, newest first.
    pub posts: Vec<PostView>,
    /// The signed-in username, `None` for anonymous visitors.
    pub username: Option<String>,
}

/// The home feed: public posts, plus own and friends' private posts when signed in.
pub async fn feed(
    State(state): State<Arc<AppState>>,
    viewer: MaybeAuthUser,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Success<FeedResponse>>, ApiError> {
    let store = state.store.as_ref();
    let viewer_id = viewer.id();

    let posts = store
        .feed(viewer_id.as_ref(), page.limit(), page.offset())
        .await?;

    Ok(success(FeedResponse {
        posts: post_views(store, posts, viewer_id.as_ref()).await?,
        username: viewer.0.map(|auth| auth.user.username),
    }))
}

/// Create post request.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    /// Text content.
    pub content: String,
    /// Optional image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Visible to friends only.
    #[serde(default)]
    pub is_private: bool,
}

/// Single post response.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// The post.
    pub post: PostView,
}

/// Create a post.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<Success<PostResponse>>), ApiError> {
    let image_url = body
        .image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    let post = Post::new(auth.id(), &body.content, image_url, body.is_private)?;
    state.store.create_post(&post).await?;

    tracing::info!(
        user_id = %auth.id(),
        post_id = %post.id,
        is_private = post.is_private,
        "Post created"
    );

    Ok((
        StatusCode::CREATED,
        success(PostResponse {
            post: PostView::new(&post, auth.user.username, false),
        }),
    ))
}

/// Get a single post.
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    viewer: MaybeAuthUser,
    ApiPath(post_id): ApiPath<PostId>,
) -> Result<Json<Success<PostResponse>>, ApiError> {
    let store = state.store.as_ref();
    let viewer_id = viewer.id();
    let post = visible_post(store, &post_id, viewer_id.as_ref()).await?;

    Ok(success(PostResponse {
        post: post_view(store, &post, viewer_id.as_ref()).await?,
    }))
}

/// Delete one of your own posts, with its likes and comments.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(post_id): ApiPath<PostId>,
) -> Result<Json<Success<Empty>>, ApiError> {
    state.store.delete_post(&post_id, &auth.id()).await?;

    tracing::info!(user_id = %auth.id(), post_id = %post_id, "Post deleted");

    Ok(success(Empty {}))
}

/// Share request.
#[derive(Debug, Default, Deserialize)]
pub struct ShareRequest {
    /// Optional comment on the share.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Share response.
#[derive(Debug, Serialize)]
pub struct ShareResponse {
    /// The share.
    pub share: ShareView,
}

/// Share a post.
pub async fn share_post(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(post_id): ApiPath<PostId>,
    body: Option<ApiJson<ShareRequest>>,
) -> Result<(StatusCode, Json<Success<ShareResponse>>), ApiError> {
    let body = body.map(|ApiJson(body)| body).unwrap_or_default();
    let store = state.store.as_ref();
    visible_post(store, &post_id, Some(&auth.id())).await?;

    let share = Share::new(auth.id(), post_id, body.comment.as_deref())?;
    store.share_post(&share).await?;

    tracing::info!(user_id = %auth.id(), post_id = %post_id, "Post shared");

    Ok((
        StatusCode::CREATED,
        success(ShareResponse {
            share: ShareView::from(&share),
        }),
    ))
}
