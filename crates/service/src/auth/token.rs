//! HS256 bearer tokens carrying `{sub: user id, role, exp}`.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::domain::{AuthContext, Role};
use super::errors::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Signing and verification keys, built once at startup and shared read-only.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn from_secret(secret: &str, ttl_hours: i64) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::TokenError("signing secret is empty".into()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        })
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Result<Self, AuthError> {
        Self::from_secret(&cfg.jwt_secret, cfg.token_ttl_hours)
    }

    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, AuthError> {
        let exp = (Utc::now() + self.ttl).timestamp();
        self.sign(&Claims { sub: user_id.to_string(), role: role.as_str().to_string(), exp: exp.max(0) as usize })
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Any failure (signature, expiry, subject, role) yields `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|_| AuthError::Unauthorized)?;
        let user_id = data.claims.sub.parse::<i64>().map_err(|_| AuthError::Unauthorized)?;
        let role = data.claims.role.parse::<Role>().map_err(|_| AuthError::Unauthorized)?;
        Ok(AuthContext { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::from_secret("test-secret", 24).unwrap()
    }

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let k = keys();
        let token = k.issue(42, Role::Guide).unwrap();
        let ctx = k.verify(&token).unwrap();
        assert_eq!(ctx, AuthContext { user_id: 42, role: Role::Guide });
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = keys().issue(1, Role::Tourist).unwrap();
        let other = TokenKeys::from_secret("another", 24).unwrap();
        assert!(matches!(other.verify(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let k = keys();
        let exp = (Utc::now() - Duration::hours(2)).timestamp() as usize;
        let token = k.sign(&Claims { sub: "1".into(), role: "guide".into(), exp }).unwrap();
        assert!(matches!(k.verify(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        let k = keys();
        let exp = (Utc::now() + Duration::hours(1)).timestamp() as usize;
        let token = k.sign(&Claims { sub: "alice".into(), role: "guide".into(), exp }).unwrap();
        assert!(matches!(k.verify(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(keys().verify("not.a.token").is_err());
    }

    #[test]
    fn empty_secret_fails() {
        assert!(TokenKeys::from_secret("  ", 24).is_err());
    }
}
