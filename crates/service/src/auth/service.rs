use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};

use super::domain::{LoginInput, LoginOutput, RegisterInput, Role};
use super::errors::AuthError;
use super::token::TokenKeys;
use crate::users::domain::{NewUser, UserSummary};
use crate::users::repository::UserRepository;

/// Auth business service independent of web framework
pub struct AuthService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
    keys: TokenKeys,
}

impl<R: UserRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, keys: TokenKeys) -> Self { Self { repo, keys } }

    /// Register a guide or tourist with an argon2-hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, TokenKeys};
    /// use service::auth::domain::RegisterInput;
    /// use service::users::repository::mock::MockUserRepository;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockUserRepository::default());
    /// let svc = AuthService::new(repo, TokenKeys::from_secret("secret", 24).unwrap());
    /// let input = RegisterInput { username: "pera".into(), password: "vodic123".into(), email: "pera@example.com".into(), role: "guide".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.username, "pera");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username, role = %input.role))]
    pub async fn register(&self, input: RegisterInput) -> Result<UserSummary, AuthError> {
        // Administrator is refused before any other field is looked at.
        let role = input.role.parse::<Role>().ok();
        if role.is_some_and(|r| !r.is_self_assignable()) {
            return Err(AuthError::RoleNotAllowed);
        }
        let username = input.username.trim();
        let email = input.email.trim();
        if username.is_empty() || input.password.is_empty() || email.is_empty() {
            return Err(AuthError::Validation("username, password and email are required".into()));
        }
        if !email.contains('@') {
            return Err(AuthError::Validation("email is not valid".into()));
        }
        let role =
            role.ok_or_else(|| AuthError::Validation("invalid role; allowed roles are 'guide' or 'tourist'".into()))?;

        if let Some(existing) = self.repo.find_by_username(username).await? {
            debug!("username taken: {}", existing.username);
            return Err(AuthError::Conflict("Username is already taken".into()));
        }
        if self.repo.email_taken(email).await? {
            return Err(AuthError::Conflict("Email is already registered".into()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_user(NewUser { username: username.to_string(), password_hash: hash, email: email.to_string(), role })
            .await?;
        info!(user_id = user.id, role = %user.role, "user_registered");
        Ok(UserSummary::from(&user))
    }

    /// Authenticate and issue a token valid for the configured lifetime.
    ///
    /// Unknown user and wrong password are indistinguishable (`Unauthorized`);
    /// a blocked account with the right password is `Blocked`.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, TokenKeys};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use service::users::repository::mock::MockUserRepository;
    /// use std::sync::Arc;
    /// let keys = TokenKeys::from_secret("secret", 24).unwrap();
    /// let svc = AuthService::new(Arc::new(MockUserRepository::default()), keys.clone());
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "mika".into(), password: "turista123".into(), email: "mika@example.com".into(), role: "tourist".into() }));
    /// let out = tokio_test::block_on(svc.login(LoginInput { username: "mika".into(), password: "turista123".into() })).unwrap();
    /// assert_eq!(keys.verify(&out.token).unwrap().user_id, 1);
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<LoginOutput, AuthError> {
        if input.username.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("username and password are required".into()));
        }
        let user = self.repo.find_by_username(input.username.trim()).await?.ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&user.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }
        if !user.is_active {
            warn!(user_id = user.id, "login_blocked");
            return Err(AuthError::Blocked);
        }

        let token = self.keys.issue(user.id, user.role)?;
        info!(user_id = user.id, "user_logged_in");
        Ok(LoginOutput { token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repository::mock::MockUserRepository;

    fn setup() -> (Arc<MockUserRepository>, TokenKeys, AuthService<MockUserRepository>) {
        let repo = Arc::new(MockUserRepository::default());
        let keys = TokenKeys::from_secret("unit-secret", 24).unwrap();
        let svc = AuthService::new(repo.clone(), keys.clone());
        (repo, keys, svc)
    }

    fn reg(username: &str, role: &str) -> RegisterInput {
        RegisterInput {
            username: username.into(),
            password: "Passw0rd".into(),
            email: format!("{username}@example.com"),
            role: role.into(),
        }
    }

    fn login(username: &str, password: &str) -> LoginInput {
        LoginInput { username: username.into(), password: password.into() }
    }

    #[tokio::test]
    async fn register_then_login_yields_subject() {
        let (_, keys, svc) = setup();
        let user = svc.register(reg("pera", "guide")).await.unwrap();
        let out = svc.login(login("pera", "Passw0rd")).await.unwrap();
        let ctx = keys.verify(&out.token).unwrap();
        assert_eq!(ctx.user_id, user.id);
        assert_eq!(ctx.role, Role::Guide);
    }

    #[tokio::test]
    async fn administrator_registration_is_forbidden() {
        let (_, _, svc) = setup();
        assert!(matches!(svc.register(reg("root", "administrator")).await, Err(AuthError::RoleNotAllowed)));
    }

    #[tokio::test]
    async fn administrator_is_forbidden_even_with_invalid_fields() {
        let (repo, _, svc) = setup();
        let input = RegisterInput { username: "".into(), password: "".into(), email: "bad".into(), role: "administrator".into() };
        assert!(matches!(svc.register(input).await, Err(AuthError::RoleNotAllowed)));
        let input = RegisterInput { username: "root".into(), password: "x".into(), email: "no-at".into(), role: "administrator".into() };
        assert!(matches!(svc.register(input).await, Err(AuthError::RoleNotAllowed)));
        assert!(repo.find_by_username("root").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_role_is_validation_error() {
        let (_, _, svc) = setup();
        assert!(matches!(svc.register(reg("x", "pilot")).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicates_conflict() {
        let (_, _, svc) = setup();
        svc.register(reg("pera", "guide")).await.unwrap();
        assert!(matches!(svc.register(reg("pera", "tourist")).await, Err(AuthError::Conflict(_))));

        let mut same_email = reg("other", "tourist");
        same_email.email = "pera@example.com".into();
        match svc.register(same_email).await {
            Err(AuthError::Conflict(m)) => assert_eq!(m, "Email is already registered"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let (_, _, svc) = setup();
        svc.register(reg("pera", "guide")).await.unwrap();
        assert!(matches!(svc.login(login("pera", "nope")).await, Err(AuthError::Unauthorized)));
        assert!(matches!(svc.login(login("ghost", "Passw0rd")).await, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn blocked_user_cannot_login_until_unblocked() {
        let (repo, _, svc) = setup();
        let user = svc.register(reg("mika", "tourist")).await.unwrap();
        repo.set_active(user.id, false).await.unwrap();
        assert!(matches!(svc.login(login("mika", "Passw0rd")).await, Err(AuthError::Blocked)));
        repo.set_active(user.id, true).await.unwrap();
        assert!(svc.login(login("mika", "Passw0rd")).await.is_ok());
    }

    #[tokio::test]
    async fn stored_password_is_hashed() {
        let (repo, _, svc) = setup();
        svc.register(reg("pera", "guide")).await.unwrap();
        let stored = repo.find_by_username("pera").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "Passw0rd");
        assert!(stored.password_hash.starts_with("$argon2"));
    }
}
