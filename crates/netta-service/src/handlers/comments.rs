//! Comment handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use netta_core::{Comment, CommentId, PostId};
use netta_store::Store;

use super::{success, visible_post, Page, Success, Usernames};
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// A comment as returned by the API.
#[derive(Debug, Serialize)]
pub struct CommentView {
    /// Comment ID.
    pub id: String,
    /// The post commented on.
    pub post_id: String,
    /// Author ID.
    pub author_id: String,
    /// Author username.
    pub author_username: String,
    /// Text content.
    pub content: String,
    /// Created timestamp.
    pub created_at: String,
}

impl CommentView {
    fn new(comment: &Comment, author_username: String) -> Self {
        Self {
            id: comment.id.to_string(),
            post_id: comment.post_id.to_string(),
            author_id: comment.author_id.to_string(),
            author_username,
            content: comment.content.clone(),
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Add comment request.
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    /// The post to comment on.
    pub post_id: PostId,
    /// Text content.
    pub content: String,
}

/// Add comment response.
#[derive(Debug, Serialize)]
pub struct AddCommentResponse {
    /// The new comment.
    pub comment: CommentView,
    /// The post's comment count afterwards.
    pub comments_count: i64,
}

/// Comment on a post.
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<AddCommentRequest>,
) -> Result<(StatusCode, Json<Success<AddCommentResponse>>), ApiError> {
    let comment = Comment::new(body.post_id, auth.id(), &body.content)?;
    visible_post(state.store.as_ref(), &body.post_id, Some(&auth.id())).await?;

    let outcome = state.store.add_comment(&comment).await?;

    tracing::info!(
        user_id = %auth.id(),
        post_id = %comment.post_id,
        comment_id = %comment.id,
        "Comment added"
    );

    Ok((
        StatusCode::CREATED,
        success(AddCommentResponse {
            comment: CommentView::new(&comment, auth.user.username),
            comments_count: outcome.comments_count,
        }),
    ))
}

/// Comments response.
#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    /// Comments, oldest first.
    pub comments: Vec<CommentView>,
}

/// List a post's comments.
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    viewer: MaybeAuthUser,
    ApiPath(post_id): ApiPath<PostId>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Success<CommentsResponse>>, ApiError> {
    let store = state.store.as_ref();
    visible_post(store, &post_id, viewer.id().as_ref()).await?;

    let comments = store
        .list_comments(&post_id, page.limit(), page.offset())
        .await?;

    let mut names = Usernames::new(store);
    if let Some(auth) = &viewer.0 {
        names.remember(&auth.user);
    }
    let mut views = Vec::with_capacity(comments.len());
    for comment in &comments {
        let author = names.get(comment.author_id).await?;
        views.push(CommentView::new(comment, author));
    }

    Ok(success(CommentsResponse { comments: views }))
}

/// Delete comment response.
#[derive(Debug, Serialize)]
pub struct DeleteCommentResponse {
    /// The post's comment count afterwards.
    pub comments_count: i64,
}

/// Delete a comment. Allowed for the comment's author and the post's author.
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(comment_id): ApiPath<CommentId>,
) -> Result<Json<Success<DeleteCommentResponse>>, ApiError> {
    let outcome = state.store.delete_comment(&comment_id, &auth.id()).await?;

    tracing::info!(user_id = %auth.id(), comment_id = %comment_id, "Comment deleted");

    Ok(success(DeleteCommentResponse {
        comments_count: outcome.comments_count,
    }))
}
