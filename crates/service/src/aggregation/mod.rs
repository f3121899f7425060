//! Fan-out aggregation: enrich locally owned rows with author data owned by a peer.
//!
//! Peers are reached through [`IdentityResolver`] and [`FollowingResolver`]. Every
//! peer failure degrades to an empty result and is logged; it never fails the
//! primary request.

mod http;
pub mod mock;

pub use http::{HttpFollowingResolver, HttpIdentityResolver};

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Display name used in the blog feed when the author cannot be resolved.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
/// Display name used in comment lists when the author cannot be resolved.
pub const UNKNOWN_USER: &str = "Unknown User";
/// Display name used for a freshly created comment when the caller cannot be resolved.
pub const SELF_AUTHOR: &str = "You";

/// Author display data as served by the stakeholders batch endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInfo {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

impl AuthorInfo {
    pub fn fallback(name: &str) -> Self {
        Self { username: name.to_string(), first_name: None, profile_image_url: None }
    }
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer transport error: {0}")]
    Transport(String),
    #[error("peer returned status {0}")]
    Status(u16),
    #[error("peer response could not be decoded: {0}")]
    Decode(String),
}

/// Batched author lookup against the identity peer.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, ids: &[i64]) -> Result<HashMap<i64, AuthorInfo>, PeerError>;
}

/// "Who does the caller follow", answered by the followers peer.
#[async_trait]
pub trait FollowingResolver: Send + Sync {
    async fn following(&self, bearer_token: &str) -> Result<Vec<i64>, PeerError>;
}

/// Sorted, de-duplicated ids.
pub fn distinct_ids<I: IntoIterator<Item = i64>>(ids: I) -> Vec<i64> {
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Resolve authors in one call; empty mapping on any failure.
pub async fn resolve_or_empty(resolver: &dyn IdentityResolver, ids: &[i64]) -> HashMap<i64, AuthorInfo> {
    if ids.is_empty() {
        return HashMap::new();
    }
    match resolver.resolve(ids).await {
        Ok(map) => map,
        Err(e) => {
            warn!(error = %e, count = ids.len(), event = "identity_lookup_failed", "continuing without author data");
            HashMap::new()
        }
    }
}

/// Authors whose posts the caller may see: everyone they follow plus themselves.
pub async fn allowed_authors(resolver: &dyn FollowingResolver, bearer_token: &str, self_id: i64) -> HashSet<i64> {
    let mut allowed: HashSet<i64> = match resolver.following(bearer_token).await {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            warn!(error = %e, user_id = self_id, event = "following_lookup_failed", "showing only own posts");
            HashSet::new()
        }
    };
    allowed.insert(self_id);
    allowed
}

pub fn author_or(map: &HashMap<i64, AuthorInfo>, id: i64, fallback: &str) -> AuthorInfo {
    map.get(&id).cloned().unwrap_or_else(|| AuthorInfo::fallback(fallback))
}
