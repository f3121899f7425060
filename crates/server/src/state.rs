use std::sync::Arc;

use axum::extract::FromRef;
use service::auth::{AuthService, TokenKeys};
use service::blogs::repository::BlogRepository;
use service::blogs::BlogService;
use service::users::repository::UserRepository;
use service::users::UserService;

/// Name reported by `/health`.
#[derive(Debug, Clone)]
pub struct ServiceName(pub Arc<str>);

#[derive(Clone)]
pub struct StakeholdersState {
    pub auth: Arc<AuthService<dyn UserRepository>>,
    pub users: Arc<UserService<dyn UserRepository>>,
    pub keys: TokenKeys,
    pub service_name: ServiceName,
}

impl StakeholdersState {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        store: Arc<dyn service::storage::ObjectStore>,
        keys: TokenKeys,
        service_name: &str,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(repo.clone(), keys.clone())),
            users: Arc::new(UserService::new(repo, store)),
            keys,
            service_name: ServiceName(service_name.into()),
        }
    }
}

#[derive(Clone)]
pub struct BlogState {
    pub blogs: Arc<BlogService<dyn BlogRepository>>,
    pub keys: TokenKeys,
    pub service_name: ServiceName,
}

impl BlogState {
    pub fn new(blogs: BlogService<dyn BlogRepository>, keys: TokenKeys, service_name: &str) -> Self {
        Self { blogs: Arc::new(blogs), keys, service_name: ServiceName(service_name.into()) }
    }
}

impl FromRef<StakeholdersState> for ServiceName {
    fn from_ref(s: &StakeholdersState) -> Self {
        s.service_name.clone()
    }
}

impl FromRef<BlogState> for ServiceName {
    fn from_ref(s: &BlogState) -> Self {
        s.service_name.clone()
    }
}
