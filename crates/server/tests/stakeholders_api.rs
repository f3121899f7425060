use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use server::build_stakeholders_router;
use server::startup::build_cors;
use server::state::StakeholdersState;
use service::auth::{Role, TokenKeys};
use service::storage::InMemoryObjectStore;
use service::users::domain::NewUser;
use service::users::repository::mock::MockUserRepository;

mod support;
use support::*;

struct TestApp {
    app: Router,
    repo: Arc<MockUserRepository>,
    keys: TokenKeys,
}

fn test_app() -> anyhow::Result<TestApp> {
    let repo = Arc::new(MockUserRepository::default());
    let keys = TokenKeys::from_secret(SECRET, 24)?;
    let state = StakeholdersState::new(
        repo.clone(),
        Arc::new(InMemoryObjectStore::new("http://localhost:9000")),
        keys.clone(),
        "stakeholders-service",
    );
    Ok(TestApp { app: build_stakeholders_router(state, build_cors()), repo, keys })
}

async fn register(app: &Router, username: &str, role: &str) -> anyhow::Result<StatusCode> {
    let body = json!({"username": username, "password": "lozinka123", "email": format!("{username}@example.com"), "role": role});
    Ok(send(app, json_request("POST", "/register", None, body)?).await?.status())
}

async fn login(app: &Router, username: &str) -> anyhow::Result<(StatusCode, serde_json::Value)> {
    let body = json!({"username": username, "password": "lozinka123"});
    let resp = send(app, json_request("POST", "/login", None, body)?).await?;
    let status = resp.status();
    Ok((status, json_body(resp).await?))
}

fn admin_token(t: &TestApp) -> anyhow::Result<String> {
    let admin = t.repo.seed(NewUser {
        username: "admin".into(),
        password_hash: "unused".into(),
        email: "admin@example.com".into(),
        role: Role::Administrator,
    });
    Ok(t.keys.issue(admin.id, Role::Administrator)?)
}

#[tokio::test]
async fn health_reports_service_name() -> anyhow::Result<()> {
    let t = test_app()?;
    let resp = send(&t.app, empty_request("GET", "/health", None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await?, json!({"service": "stakeholders-service", "status": "UP"}));
    Ok(())
}

#[tokio::test]
async fn register_then_login_issues_token_for_the_new_user() -> anyhow::Result<()> {
    let t = test_app()?;
    assert_eq!(register(&t.app, "pera", "guide").await?, StatusCode::CREATED);

    let (status, body) = login(&t.app, "pera").await?;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap_or_default();
    let ctx = t.keys.verify(token)?;
    assert_eq!(ctx.user_id, 1);
    assert_eq!(ctx.role, Role::Guide);
    Ok(())
}

#[tokio::test]
async fn registration_rules() -> anyhow::Result<()> {
    let t = test_app()?;
    assert_eq!(register(&t.app, "boss", "administrator").await?, StatusCode::FORBIDDEN);
    let blank_admin = json!({"username": "", "password": "", "email": "bad", "role": "administrator"});
    let resp = send(&t.app, json_request("POST", "/register", None, blank_admin)?).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(register(&t.app, "who", "pilot").await?, StatusCode::BAD_REQUEST);
    assert_eq!(register(&t.app, "mika", "tourist").await?, StatusCode::CREATED);
    assert_eq!(register(&t.app, "mika", "tourist").await?, StatusCode::CONFLICT);

    let resp = send(&t.app, json_request("POST", "/register", None, json!({"username": 1}))?).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await?["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let t = test_app()?;
    register(&t.app, "pera", "guide").await?;
    let body = json!({"username": "pera", "password": "nope"});
    let resp = send(&t.app, json_request("POST", "/login", None, body)?).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn blocked_user_cannot_login_until_unblocked() -> anyhow::Result<()> {
    let t = test_app()?;
    register(&t.app, "pera", "guide").await?;
    let admin = admin_token(&t)?;

    let resp = send(&t.app, empty_request("PUT", "/api/users/1/block", Some(&admin))?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(login(&t.app, "pera").await?.0, StatusCode::FORBIDDEN);

    let resp = send(&t.app, empty_request("PUT", "/api/users/1/unblock", Some(&admin))?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(login(&t.app, "pera").await?.0, StatusCode::OK);

    let resp = send(&t.app, empty_request("PUT", "/api/users/99/block", Some(&admin))?).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admin_routes_require_administrator() -> anyhow::Result<()> {
    let t = test_app()?;
    register(&t.app, "pera", "guide").await?;
    let (_, body) = login(&t.app, "pera").await?;
    let token = body["token"].as_str().unwrap_or_default().to_string();

    let resp = send(&t.app, empty_request("GET", "/api/users", Some(&token))?).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = admin_token(&t)?;
    let resp = send(&t.app, empty_request("GET", "/api/users", Some(&admin))?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let users = json_body(resp).await?;
    assert_eq!(users.as_array().map(Vec::len), Some(2));
    assert!(users[0].get("passwordHash").is_none());
    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() -> anyhow::Result<()> {
    let t = test_app()?;
    let resp = send(&t.app, empty_request("GET", "/profile", None)?).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await?["error"], "Authorization header is required");

    let resp = send(&t.app, empty_request("GET", "/profile", Some("garbage"))?).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let other = TokenKeys::from_secret("another-secret", 24)?.issue(1, Role::Tourist)?;
    let resp = send(&t.app, empty_request("GET", "/position", Some(&other))?).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn profile_is_null_until_saved() -> anyhow::Result<()> {
    let t = test_app()?;
    register(&t.app, "pera", "guide").await?;
    let token = t.keys.issue(1, Role::Guide)?;

    let resp = send(&t.app, empty_request("GET", "/profile", Some(&token))?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await?, serde_json::Value::Null);

    let body = json!({"firstName": "Pera", "lastName": "Peric", "motto": "Uvek napred"});
    let resp = send(&t.app, json_request("PUT", "/profile", Some(&token), body)?).await?;
    assert_eq!(json_body(resp).await?["message"], "Profile updated successfully");

    let resp = send(&t.app, empty_request("GET", "/profile", Some(&token))?).await?;
    let profile = json_body(resp).await?;
    assert_eq!(profile["firstName"], "Pera");
    assert_eq!(profile["userId"], 1);
    assert_eq!(profile["biography"], serde_json::Value::Null);
    Ok(())
}

#[tokio::test]
async fn profile_image_upload_returns_public_url() -> anyhow::Result<()> {
    let t = test_app()?;
    register(&t.app, "pera", "guide").await?;
    let token = t.keys.issue(1, Role::Guide)?;

    let req = Form::default().file("profileImage", "me.png", b"png-bytes").into_request("POST", "/profile/upload", &token)?;
    let resp = send(&t.app, req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let url = json_body(resp).await?["imageUrl"].as_str().unwrap_or_default().to_string();
    assert!(url.starts_with("http://localhost:9000/user-profiles/user-1-"));
    assert!(url.ends_with(".png"));

    let req = Form::default().text("other", "x").into_request("POST", "/profile/upload", &token)?;
    let resp = send(&t.app, req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await?["error"], "Image not provided");
    Ok(())
}

#[tokio::test]
async fn position_round_trip_and_range_check() -> anyhow::Result<()> {
    let t = test_app()?;
    register(&t.app, "mika", "tourist").await?;
    let token = t.keys.issue(1, Role::Tourist)?;

    let resp = send(&t.app, empty_request("GET", "/position", Some(&token))?).await?;
    assert_eq!(json_body(resp).await?, json!({"latitude": null, "longitude": null}));

    let resp = send(&t.app, json_request("PUT", "/position", Some(&token), json!({"latitude": 45.25, "longitude": 19.84}))?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(&t.app, empty_request("GET", "/position", Some(&token))?).await?;
    assert_eq!(json_body(resp).await?, json!({"latitude": 45.25, "longitude": 19.84}));

    let resp = send(&t.app, json_request("PUT", "/position", Some(&token), json!({"latitude": 91.0, "longitude": 0.0}))?).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn batch_lookup_is_public_and_skips_empty_input() -> anyhow::Result<()> {
    let t = test_app()?;
    register(&t.app, "pera", "guide").await?;
    register(&t.app, "mika", "tourist").await?;

    let resp = send(&t.app, empty_request("GET", "/users/batch?ids=", None)?).await?;
    assert_eq!(json_body(resp).await?, json!({}));
    assert_eq!(t.repo.info_queries(), 0);

    let resp = send(&t.app, empty_request("GET", "/users/batch?ids=1,2,7", None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let map = json_body(resp).await?;
    assert_eq!(map["1"]["username"], "pera");
    assert_eq!(map["2"]["username"], "mika");
    assert!(map.get("7").is_none());

    let resp = send(&t.app, empty_request("GET", "/users/batch?ids=1,x", None)?).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> anyhow::Result<()> {
    let t = test_app()?;
    let resp = send(&t.app, empty_request("GET", "/api-docs/openapi.json", None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc = json_body(resp).await?;
    assert!(doc["paths"]["/register"].is_object());
    Ok(())
}
