use std::{net::SocketAddr, sync::Arc};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use configs::AppConfig;
use migration::{BlogMigrator, MigratorTrait, StakeholdersMigrator};
use service::aggregation::{HttpFollowingResolver, HttpIdentityResolver};
use service::auth::TokenKeys;
use service::blogs::repo::SeaOrmBlogRepository;
use service::blogs::repository::BlogRepository;
use service::blogs::BlogService;
use service::storage::S3ObjectStore;
use service::users::repo::SeaOrmUserRepository;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::auth::require_bearer;
use crate::errors::StartupError;
use crate::routes::{self, blogs, stakeholders};
use crate::state::{BlogState, StakeholdersState};

/// Multipart uploads carry images; axum's 2 MiB default is too small.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Shared outer layers: request spans at INFO, failures at ERROR, then CORS.
fn with_http_layers(router: Router, cors: CorsLayer) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                    .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
            )
            .layer(cors),
    )
}

/// Public: health, docs, register, login and the peer batch lookup.
/// Everything else requires a bearer token.
pub fn build_stakeholders_router(state: StakeholdersState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(routes::health))
        .route("/api-docs/openapi.json", get(routes::stakeholders_openapi))
        .route("/register", post(stakeholders::register))
        .route("/login", post(stakeholders::login))
        .route("/users/batch", get(stakeholders::users_batch));

    let protected = Router::new()
        .route("/profile", get(stakeholders::get_profile).put(stakeholders::put_profile))
        .route("/profile/upload", post(stakeholders::upload_profile_image))
        .route("/position", get(stakeholders::get_position).put(stakeholders::put_position))
        .route("/api/users", get(stakeholders::list_users))
        .route("/api/users/:id/block", put(stakeholders::block_user))
        .route("/api/users/:id/unblock", put(stakeholders::unblock_user))
        .route_layer(middleware::from_fn_with_state(state.keys.clone(), require_bearer));

    let app = public
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);
    with_http_layers(app, cors)
}

/// Only `/health` and the docs are public.
pub fn build_blog_router(state: BlogState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(routes::health))
        .route("/api-docs/openapi.json", get(routes::blog_openapi));

    let protected = Router::new()
        .route("/blogs", get(blogs::list_blogs).post(blogs::create_blog))
        .route("/blogs/:id", put(blogs::update_blog))
        .route("/blogs/:id/comments", get(blogs::list_comments).post(blogs::add_comment))
        .route("/blogs/:id/like", post(blogs::toggle_like))
        .route_layer(middleware::from_fn_with_state(state.keys.clone(), require_bearer));

    let app = public
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);
    with_http_layers(app, cors)
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

fn check_storage_env(cfg: &AppConfig) {
    if cfg.storage.access_key.is_empty() || cfg.storage.secret_key.is_empty() {
        common::env::missing_vars(&["MINIO_ACCESS_KEY", "MINIO_SECRET_KEY"]);
    }
}

async fn serve(app: Router, cfg: &AppConfig) -> anyhow::Result<()> {
    let addr = bind_addr(cfg)?;
    info!(%addr, service = %cfg.server.service_name, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Connect, migrate, wire the stakeholders service and serve until the listener fails.
pub async fn run_stakeholders_service(cfg: AppConfig) -> anyhow::Result<()> {
    check_storage_env(&cfg);
    let keys = TokenKeys::from_config(&cfg.auth).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Dependency(format!("database: {e}")))?;
    StakeholdersMigrator::up(&db, None).await?;

    let store = S3ObjectStore::from_config(&cfg.storage)
        .await
        .map_err(|e| StartupError::Dependency(format!("object storage: {e}")))?;

    let state = StakeholdersState::new(
        Arc::new(SeaOrmUserRepository::new(db)),
        Arc::new(store),
        keys,
        &cfg.server.service_name,
    );
    serve(build_stakeholders_router(state, build_cors()), &cfg).await
}

/// Connect, migrate, wire the blog service with its peers and serve.
pub async fn run_blog_service(cfg: AppConfig) -> anyhow::Result<()> {
    check_storage_env(&cfg);
    let keys = TokenKeys::from_config(&cfg.auth).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Dependency(format!("database: {e}")))?;
    BlogMigrator::up(&db, None).await?;

    let store = S3ObjectStore::from_config(&cfg.storage)
        .await
        .map_err(|e| StartupError::Dependency(format!("object storage: {e}")))?;
    let identity = HttpIdentityResolver::new(cfg.peers.stakeholders_url.clone(), cfg.peers.timeout())
        .map_err(|e| StartupError::Dependency(e.to_string()))?;
    let following = HttpFollowingResolver::new(cfg.peers.followers_url.clone(), cfg.peers.timeout())
        .map_err(|e| StartupError::Dependency(e.to_string()))?;
    info!(
        stakeholders = %cfg.peers.stakeholders_url,
        followers = %cfg.peers.followers_url,
        timeout_ms = cfg.peers.timeout_ms,
        "peer endpoints configured"
    );

    let repo: Arc<dyn BlogRepository> = Arc::new(SeaOrmBlogRepository::new(db));
    let blogs = BlogService::new(
        repo,
        Arc::new(identity),
        Arc::new(following),
        Arc::new(store),
    );
    let state = BlogState::new(blogs, keys, &cfg.server.service_name);
    serve(build_blog_router(state, build_cors()), &cfg).await
}
