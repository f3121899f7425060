//! Handlers of the blog service. Every route here sits behind the bearer middleware.
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common::types::MessageBody;
use serde::{Deserialize, Serialize};
use service::auth::AuthContext;
use service::blogs::domain::{Blog, BlogWithStats, CommentWithAuthor, CreateBlogInput, UpdateBlogInput};

use super::FormData;
use crate::auth::BearerToken;
use crate::errors::ApiError;
use crate::state::BlogState;

const IMAGES_FIELD: &str = "images";

#[derive(Debug, Default, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub message: String,
    pub likes_count: i64,
}

fn blog_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::bad_request("Invalid blog ID"))
}

/// Blogs by followed authors and by the caller, newest first.
#[utoipa::path(get, path = "/blogs", tag = "blogs", security(("bearer" = [])),
    responses((status = 200, description = "Feed", body = [crate::openapi::BlogWithStatsDoc]), (status = 401, description = "Unauthenticated")))]
pub async fn list_blogs(
    State(state): State<BlogState>,
    Extension(ctx): Extension<AuthContext>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<Vec<BlogWithStats>>, ApiError> {
    Ok(Json(state.blogs.list_feed(&ctx, &token).await?))
}

#[utoipa::path(post, path = "/blogs", tag = "blogs", security(("bearer" = [])),
    request_body(content = crate::openapi::CreateBlogForm, content_type = "multipart/form-data"),
    responses((status = 201, description = "Created", body = crate::openapi::BlogDoc), (status = 400, description = "Title is required")))]
pub async fn create_blog(
    State(state): State<BlogState>,
    Extension(ctx): Extension<AuthContext>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Blog>), ApiError> {
    let mut form = FormData::read(multipart).await?;
    let input = CreateBlogInput { title: form.text("title"), description_markdown: form.text("descriptionMarkdown") };
    let files = form.take_files(IMAGES_FIELD);
    let blog = state.blogs.create_blog(&ctx, input, files).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

/// Partial update. Fields left out of the form are not touched.
#[utoipa::path(put, path = "/blogs/{id}", tag = "blogs", security(("bearer" = [])),
    params(("id" = i64, Path, description = "Blog id")),
    request_body(content = crate::openapi::UpdateBlogForm, content_type = "multipart/form-data"),
    responses((status = 200, description = "Updated", body = crate::openapi::MessageResponse), (status = 400, description = "Nothing to update"), (status = 404, description = "Not found or not the author")))]
pub async fn update_blog(
    State(state): State<BlogState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    multipart: Multipart,
) -> Result<Json<MessageBody>, ApiError> {
    let id = blog_id(id)?;
    let mut form = FormData::read(multipart).await?;
    let input = UpdateBlogInput {
        title: form.text("title"),
        description_markdown: form.text("descriptionMarkdown"),
        images_to_delete: form.texts("imagesToDelete"),
    };
    let files = form.take_files(IMAGES_FIELD);
    state.blogs.update_blog(&ctx, id, input, files).await?;
    Ok(Json(MessageBody::new("Blog updated successfully")))
}

#[utoipa::path(post, path = "/blogs/{id}/comments", tag = "comments", security(("bearer" = [])),
    params(("id" = i64, Path, description = "Blog id")), request_body = crate::openapi::CommentRequestDoc,
    responses((status = 201, description = "Created", body = crate::openapi::CommentDoc), (status = 400, description = "Empty text"), (status = 404, description = "Unknown blog")))]
pub async fn add_comment(
    State(state): State<BlogState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentWithAuthor>), ApiError> {
    let id = blog_id(id)?;
    let Json(body) = payload?;
    let comment = state.blogs.add_comment(&ctx, id, body.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(get, path = "/blogs/{id}/comments", tag = "comments", security(("bearer" = [])),
    params(("id" = i64, Path, description = "Blog id")),
    responses((status = 200, description = "Comments, newest first", body = [crate::openapi::CommentDoc])))]
pub async fn list_comments(
    State(state): State<BlogState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<CommentWithAuthor>>, ApiError> {
    let id = blog_id(id)?;
    Ok(Json(state.blogs.list_comments(id).await?))
}

#[utoipa::path(post, path = "/blogs/{id}/like", tag = "likes", security(("bearer" = [])),
    params(("id" = i64, Path, description = "Blog id")),
    responses((status = 200, description = "Like toggled", body = crate::openapi::LikeResponseDoc), (status = 404, description = "Unknown blog")))]
pub async fn toggle_like(
    State(state): State<BlogState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<LikeResponse>, ApiError> {
    let id = blog_id(id)?;
    let outcome = state.blogs.toggle_like(&ctx, id).await?;
    Ok(Json(LikeResponse {
        message: format!("Successfully {}", outcome.action.as_str()),
        likes_count: outcome.likes_count,
    }))
}
