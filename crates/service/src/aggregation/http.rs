use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{AuthorInfo, FollowingResolver, IdentityResolver, PeerError};

fn build_client(timeout: Duration) -> Result<reqwest::Client, PeerError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PeerError::Transport(e.to_string()))
}

/// Calls `GET {base}/users/batch?ids=1,2,3` on the stakeholders service.
#[derive(Clone)]
pub struct HttpIdentityResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityResolver {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PeerError> {
        Ok(Self { client: build_client(timeout)?, base_url: base_url.into().trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentityResolver {
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn resolve(&self, ids: &[i64]) -> Result<HashMap<i64, AuthorInfo>, PeerError> {
        let joined = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
        let resp = self
            .client
            .get(format!("{}/users/batch", self.base_url))
            .query(&[("ids", joined)])
            .send()
            .await
            .map_err(|e| PeerError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(PeerError::Status(resp.status().as_u16()));
        }
        let map = resp
            .json::<HashMap<i64, AuthorInfo>>()
            .await
            .map_err(|e| PeerError::Decode(e.to_string()))?;
        debug!(resolved = map.len(), "identity lookup done");
        Ok(map)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FollowingEntry {
    user_id: i64,
}

/// Calls `GET {base}/api/followers/me/following`, forwarding the caller's token.
#[derive(Clone)]
pub struct HttpFollowingResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFollowingResolver {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PeerError> {
        Ok(Self { client: build_client(timeout)?, base_url: base_url.into().trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl FollowingResolver for HttpFollowingResolver {
    #[instrument(skip_all)]
    async fn following(&self, bearer_token: &str) -> Result<Vec<i64>, PeerError> {
        let resp = self
            .client
            .get(format!("{}/api/followers/me/following", self.base_url))
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| PeerError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(PeerError::Status(resp.status().as_u16()));
        }
        let entries = resp
            .json::<Vec<FollowingEntry>>()
            .await
            .map_err(|e| PeerError::Decode(e.to_string()))?;
        Ok(entries.into_iter().map(|e| e.user_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn spawn(app: Router) -> String {
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn batch_lookup_decodes_id_keyed_map() {
        let app = Router::new().route(
            "/users/batch",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("ids").map(String::as_str), Some("2,3"));
                Json(json!({
                    "2": {"id": 2, "username": "pera", "firstName": "Pera", "profileImageUrl": null},
                    "3": {"id": 3, "username": "mika"}
                }))
            }),
        );
        let base = spawn(app).await;
        let resolver = HttpIdentityResolver::new(base, Duration::from_secs(2)).unwrap();
        let map = resolver.resolve(&[2, 3]).await.unwrap();
        assert_eq!(map[&2].first_name.as_deref(), Some("Pera"));
        assert_eq!(map[&3].username, "mika");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new().route("/users/batch", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let base = spawn(app).await;
        let resolver = HttpIdentityResolver::new(base, Duration::from_secs(2)).unwrap();
        assert!(matches!(resolver.resolve(&[1]).await, Err(PeerError::Status(500))));
    }

    #[tokio::test]
    async fn slow_peer_times_out() {
        let app = Router::new().route(
            "/users/batch",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!({}))
            }),
        );
        let base = spawn(app).await;
        let resolver = HttpIdentityResolver::new(base, Duration::from_millis(50)).unwrap();
        assert!(matches!(resolver.resolve(&[1]).await, Err(PeerError::Transport(_))));
    }

    #[tokio::test]
    async fn following_forwards_bearer_token() {
        let app = Router::new().route(
            "/api/followers/me/following",
            get(|headers: HeaderMap| async move {
                let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or_default();
                if auth != "Bearer abc" {
                    return Err(StatusCode::UNAUTHORIZED);
                }
                Ok(Json::<Value>(json!([{"userId": 4}, {"userId": 8}])))
            }),
        );
        let base = spawn(app).await;
        let resolver = HttpFollowingResolver::new(base, Duration::from_secs(2)).unwrap();
        assert_eq!(resolver.following("abc").await.unwrap(), vec![4, 8]);
        assert!(matches!(resolver.following("wrong").await, Err(PeerError::Status(401))));
    }

    #[tokio::test]
    async fn unreachable_peer_is_transport_error() {
        let resolver = HttpFollowingResolver::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
        assert!(matches!(resolver.following("t").await, Err(PeerError::Transport(_))));
    }
}
