//! Bearer-token middleware for protected routes.
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use service::auth::TokenKeys;
use tracing::warn;

use crate::errors::ApiError;

/// Raw token of the current request, forwarded to peers that need the caller's identity.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Verify `Authorization: Bearer <token>` and attach the caller's
/// [`AuthContext`](service::auth::AuthContext) and [`BearerToken`] to the request.
pub async fn require_bearer(State(keys): State<TokenKeys>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Authorization header is required"))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Bearer token not found"))?
        .to_string();

    let ctx = keys.verify(&token).map_err(|e| {
        warn!(path = %req.uri().path(), error = %e, "token validation failed");
        ApiError::unauthorized("Invalid or expired token")
    })?;

    req.extensions_mut().insert(ctx);
    req.extensions_mut().insert(BearerToken(token));
    Ok(next.run(req).await)
}
