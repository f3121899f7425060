//! OpenAPI documents served at `/api-docs/openapi.json` by each service.
use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub service: String,
    #[schema(example = "UP")]
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    #[schema(example = "guide")]
    pub role: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub biography: Option<String>,
    pub motto: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDoc {
    pub id: i64,
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub biography: Option<String>,
    pub motto: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageForm {
    #[schema(value_type = String, format = Binary)]
    pub profile_image: Vec<u8>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUrlResponse {
    pub image_url: String,
}

#[derive(Serialize, ToSchema)]
pub struct PositionRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, ToSchema)]
pub struct PositionDoc {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDoc {
    pub username: String,
    pub first_name: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogDoc {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub description_markdown: Option<String>,
    #[schema(example = "2024-05-01T10:00:00Z")]
    pub creation_date: String,
    pub last_modified_date: String,
    pub image_urls: Vec<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsDoc {
    pub likes_count: i64,
    pub comments_count: i64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogWithStatsDoc {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub description_markdown: Option<String>,
    pub creation_date: String,
    pub last_modified_date: String,
    pub image_urls: Vec<String>,
    pub stats: StatsDoc,
    pub author: AuthorDoc,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogForm {
    pub title: String,
    pub description_markdown: Option<String>,
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<Vec<u8>>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogForm {
    pub title: Option<String>,
    pub description_markdown: Option<String>,
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<Vec<u8>>,
    pub images_to_delete: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CommentRequestDoc {
    pub text: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentDoc {
    pub id: i64,
    pub blog_id: i64,
    pub author_id: i64,
    pub text: String,
    pub creation_time: String,
    pub last_modified_time: String,
    pub author: AuthorDoc,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponseDoc {
    #[schema(example = "Successfully liked")]
    pub message: String,
    pub likes_count: i64,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::stakeholders::register,
        crate::routes::stakeholders::login,
        crate::routes::stakeholders::get_profile,
        crate::routes::stakeholders::put_profile,
        crate::routes::stakeholders::upload_profile_image,
        crate::routes::stakeholders::get_position,
        crate::routes::stakeholders::put_position,
        crate::routes::stakeholders::list_users,
        crate::routes::stakeholders::block_user,
        crate::routes::stakeholders::unblock_user,
        crate::routes::stakeholders::users_batch,
    ),
    components(schemas(
        HealthResponse,
        MessageResponse,
        RegisterRequest,
        LoginRequest,
        TokenResponse,
        ProfileRequest,
        ProfileDoc,
        ProfileImageForm,
        ImageUrlResponse,
        PositionRequest,
        PositionDoc,
        UserDoc,
        AuthorDoc,
    )),
    modifiers(&BearerAuth),
    tags((name = "health"), (name = "auth"), (name = "profile"), (name = "position"), (name = "admin"), (name = "peers"))
)]
pub struct StakeholdersApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::blogs::list_blogs,
        crate::routes::blogs::create_blog,
        crate::routes::blogs::update_blog,
        crate::routes::blogs::add_comment,
        crate::routes::blogs::list_comments,
        crate::routes::blogs::toggle_like,
    ),
    components(schemas(
        HealthResponse,
        MessageResponse,
        AuthorDoc,
        BlogDoc,
        StatsDoc,
        BlogWithStatsDoc,
        CreateBlogForm,
        UpdateBlogForm,
        CommentRequestDoc,
        CommentDoc,
        LikeResponseDoc,
    )),
    modifiers(&BearerAuth),
    tags((name = "health"), (name = "blogs"), (name = "comments"), (name = "likes"))
)]
pub struct BlogApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_list_their_routes() {
        let blog = BlogApiDoc::openapi();
        assert!(blog.paths.paths.contains_key("/blogs/{id}/like"));
        assert!(!blog.paths.paths.contains_key("/login"));

        let stakeholders = StakeholdersApiDoc::openapi();
        assert!(stakeholders.paths.paths.contains_key("/users/batch"));
        assert!(stakeholders.components.unwrap().security_schemes.contains_key("bearer"));
    }
}
