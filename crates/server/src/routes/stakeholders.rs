//! Handlers of the stakeholders service: accounts, profiles, positions, admin.
use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common::types::MessageBody;
use serde::{Deserialize, Serialize};
use service::aggregation::AuthorInfo;
use service::auth::domain::{LoginInput, LoginOutput, RegisterInput};
use service::auth::AuthContext;
use service::users::domain::{parse_id_list, Position, PositionInput, Profile, ProfileInput, UserSummary};

use super::FormData;
use crate::errors::ApiError;
use crate::state::StakeholdersState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUrlBody {
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    #[serde(default)]
    pub ids: String,
}

#[utoipa::path(post, path = "/register", tag = "auth", request_body = crate::openapi::RegisterRequest,
    responses((status = 201, description = "User created", body = crate::openapi::MessageResponse), (status = 400, description = "Bad Request"), (status = 403, description = "Role not allowed"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<StakeholdersState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    let Json(input) = payload?;
    state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(MessageBody::new("User created successfully"))))
}

#[utoipa::path(post, path = "/login", tag = "auth", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged in", body = crate::openapi::TokenResponse), (status = 401, description = "Invalid credentials"), (status = 403, description = "Account blocked")))]
pub async fn login(
    State(state): State<StakeholdersState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<LoginOutput>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.auth.login(input).await?))
}

/// The caller's profile, or JSON `null` before the first save.
#[utoipa::path(get, path = "/profile", tag = "profile", security(("bearer" = [])),
    responses((status = 200, description = "Profile or null", body = crate::openapi::ProfileDoc)))]
pub async fn get_profile(
    State(state): State<StakeholdersState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Option<Profile>>, ApiError> {
    Ok(Json(state.users.get_profile(ctx.user_id).await?))
}

#[utoipa::path(put, path = "/profile", tag = "profile", security(("bearer" = [])), request_body = crate::openapi::ProfileRequest,
    responses((status = 200, description = "Profile saved", body = crate::openapi::MessageResponse)))]
pub async fn put_profile(
    State(state): State<StakeholdersState>,
    Extension(ctx): Extension<AuthContext>,
    payload: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(input) = payload?;
    state.users.update_profile(ctx.user_id, input).await?;
    Ok(Json(MessageBody::new("Profile updated successfully")))
}

#[utoipa::path(post, path = "/profile/upload", tag = "profile", security(("bearer" = [])),
    request_body(content = crate::openapi::ProfileImageForm, content_type = "multipart/form-data"),
    responses((status = 200, description = "Image stored", body = crate::openapi::ImageUrlResponse), (status = 400, description = "Image not provided")))]
pub async fn upload_profile_image(
    State(state): State<StakeholdersState>,
    Extension(ctx): Extension<AuthContext>,
    multipart: Multipart,
) -> Result<Json<ImageUrlBody>, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let file = form
        .take_files("profileImage")
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::bad_request("Image not provided"))?;
    let image_url = state.users.upload_profile_image(ctx.user_id, file).await?;
    Ok(Json(ImageUrlBody { image_url }))
}

#[utoipa::path(get, path = "/position", tag = "position", security(("bearer" = [])),
    responses((status = 200, description = "Last known position", body = crate::openapi::PositionDoc)))]
pub async fn get_position(
    State(state): State<StakeholdersState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Position>, ApiError> {
    Ok(Json(state.users.get_position(ctx.user_id).await?))
}

#[utoipa::path(put, path = "/position", tag = "position", security(("bearer" = [])), request_body = crate::openapi::PositionRequest,
    responses((status = 200, description = "Position saved", body = crate::openapi::MessageResponse), (status = 400, description = "Out of range")))]
pub async fn put_position(
    State(state): State<StakeholdersState>,
    Extension(ctx): Extension<AuthContext>,
    payload: Result<Json<PositionInput>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(input) = payload?;
    state.users.update_position(ctx.user_id, input).await?;
    Ok(Json(MessageBody::new("Position updated successfully")))
}

#[utoipa::path(get, path = "/api/users", tag = "admin", security(("bearer" = [])),
    responses((status = 200, description = "All users", body = [crate::openapi::UserDoc]), (status = 403, description = "Administrator only")))]
pub async fn list_users(
    State(state): State<StakeholdersState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.users.list_users(&ctx).await?))
}

#[utoipa::path(put, path = "/api/users/{id}/block", tag = "admin", security(("bearer" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses((status = 200, description = "Blocked", body = crate::openapi::MessageResponse), (status = 403, description = "Administrator only"), (status = 404, description = "Unknown user")))]
pub async fn block_user(
    State(state): State<StakeholdersState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Path(id) = id?;
    state.users.set_blocked(&ctx, id, true).await?;
    Ok(Json(MessageBody::new("User blocked successfully")))
}

#[utoipa::path(put, path = "/api/users/{id}/unblock", tag = "admin", security(("bearer" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses((status = 200, description = "Unblocked", body = crate::openapi::MessageResponse), (status = 403, description = "Administrator only"), (status = 404, description = "Unknown user")))]
pub async fn unblock_user(
    State(state): State<StakeholdersState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Path(id) = id?;
    state.users.set_blocked(&ctx, id, false).await?;
    Ok(Json(MessageBody::new("User unblocked successfully")))
}

/// Peer lookup used by the blog service: `?ids=1,2,3` to id-keyed author info.
#[utoipa::path(get, path = "/users/batch", tag = "peers",
    params(("ids" = String, Query, description = "Comma-separated user ids")),
    responses((status = 200, description = "Author info keyed by user id"), (status = 400, description = "Malformed id list")))]
pub async fn users_batch(
    State(state): State<StakeholdersState>,
    query: Result<Query<BatchQuery>, QueryRejection>,
) -> Result<Json<HashMap<i64, AuthorInfo>>, ApiError> {
    let Query(q) = query?;
    let ids = parse_id_list(&q.ids)?;
    Ok(Json(state.users.users_info_by_ids(&ids).await?))
}
