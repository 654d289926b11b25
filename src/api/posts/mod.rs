//! Post endpoints
//!
//! Reads are public. Writes require a bearer token, and edits and deletes
//! are restricted to the post's author.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Path};
use crate::domain::post::{Post, PostId, PostWithAuthor};
use crate::infrastructure::post::PostInput;

pub const POST_DELETED: &str = "Post deleted successfully";

/// Create the posts router
pub fn create_posts_router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl From<PostRequest> for PostInput {
    fn from(request: PostRequest) -> Self {
        PostInput::new(request.title, request.content)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    Json(request): Json<PostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.post_service.create(author, request.into()).await?;
    info!(post_id = %post.id, author_id = %author, "Post created");

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostWithAuthor>>, ApiError> {
    Ok(Json(state.post_service.list().await?))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let id = PostId::parse(&id)?;
    Ok(Json(state.post_service.get(id).await?))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    RequireUser(requester): RequireUser,
    Path(id): Path<String>,
    Json(request): Json<PostRequest>,
) -> Result<Json<Post>, ApiError> {
    let id = PostId::parse(&id)?;
    let post = state
        .post_service
        .update(id, requester, request.into())
        .await?;
    info!(post_id = %id, author_id = %requester, "Post updated");

    Ok(Json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    RequireUser(requester): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = PostId::parse(&id)?;
    state.post_service.delete(id, requester).await?;
    info!(post_id = %id, author_id = %requester, "Post deleted");

    Ok(Json(MessageResponse {
        message: POST_DELETED.to_string(),
    }))
}
