//! Canned resolvers for tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{AuthorInfo, FollowingResolver, IdentityResolver, PeerError};

/// Returns the configured authors that were asked for; counts calls.
#[derive(Default)]
pub struct StaticIdentityResolver {
    authors: HashMap<i64, AuthorInfo>,
    calls: AtomicUsize,
}

impl StaticIdentityResolver {
    pub fn new(authors: impl IntoIterator<Item = (i64, AuthorInfo)>) -> Self {
        Self { authors: authors.into_iter().collect(), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self, ids: &[i64]) -> Result<HashMap<i64, AuthorInfo>, PeerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ids.iter().filter_map(|id| self.authors.get(id).map(|a| (*id, a.clone()))).collect())
    }
}

#[derive(Default)]
pub struct StaticFollowingResolver {
    following: Vec<i64>,
}

impl StaticFollowingResolver {
    pub fn new(following: Vec<i64>) -> Self {
        Self { following }
    }
}

#[async_trait]
impl FollowingResolver for StaticFollowingResolver {
    async fn following(&self, _bearer_token: &str) -> Result<Vec<i64>, PeerError> {
        Ok(self.following.clone())
    }
}

/// A peer that is always down.
pub struct FailingResolver;

#[async_trait]
impl IdentityResolver for FailingResolver {
    async fn resolve(&self, _ids: &[i64]) -> Result<HashMap<i64, AuthorInfo>, PeerError> {
        Err(PeerError::Transport("connection refused".into()))
    }
}

#[async_trait]
impl FollowingResolver for FailingResolver {
    async fn following(&self, _bearer_token: &str) -> Result<Vec<i64>, PeerError> {
        Err(PeerError::Status(503))
    }
}
