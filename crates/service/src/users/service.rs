use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use super::domain::{Position, PositionInput, Profile, ProfileInput, UserSummary};
use super::repository::UserRepository;
use crate::aggregation::{distinct_ids, AuthorInfo};
use crate::auth::AuthContext;
use crate::errors::ServiceError;
use crate::storage::{profile_image_key, ObjectStore, UploadedFile, PROFILE_IMAGES_BUCKET};

/// Profiles, positions, administration and the batch lookup used by peers.
pub struct UserService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
    store: Arc<dyn ObjectStore>,
}

impl<R: UserRepository + ?Sized> UserService<R> {
    pub fn new(repo: Arc<R>, store: Arc<dyn ObjectStore>) -> Self {
        Self { repo, store }
    }

    /// `None` when the user has never saved a profile.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>, ServiceError> {
        self.repo.get_profile(user_id).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(&self, user_id: i64, input: ProfileInput) -> Result<(), ServiceError> {
        self.repo.upsert_profile(user_id, input).await?;
        info!(user_id, event = "profile_updated");
        Ok(())
    }

    /// Store the image and point the profile at it. Returns the public URL.
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn upload_profile_image(&self, user_id: i64, file: UploadedFile) -> Result<String, ServiceError> {
        if file.bytes.is_empty() {
            return Err(ServiceError::Validation("uploaded file is empty".into()));
        }
        let key = profile_image_key(user_id, Utc::now().timestamp(), &file.extension());
        let url = self
            .store
            .put_object(PROFILE_IMAGES_BUCKET, &key, file.bytes, file.content_type.as_deref())
            .await?;
        self.repo.set_profile_image(user_id, &url).await?;
        info!(user_id, %url, event = "profile_image_uploaded");
        Ok(url)
    }

    #[instrument(skip(self))]
    pub async fn get_position(&self, user_id: i64) -> Result<Position, ServiceError> {
        self.repo.get_position(user_id).await?.ok_or_else(|| ServiceError::not_found("user"))
    }

    #[instrument(skip(self))]
    pub async fn update_position(&self, user_id: i64, input: PositionInput) -> Result<(), ServiceError> {
        input.validate()?;
        if !self.repo.set_position(user_id, input.latitude, input.longitude).await? {
            return Err(ServiceError::not_found("user"));
        }
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(caller = ctx.user_id))]
    pub async fn list_users(&self, ctx: &AuthContext) -> Result<Vec<UserSummary>, ServiceError> {
        require_admin(ctx)?;
        self.repo.list_users().await
    }

    /// Flip the active flag. Blocked users cannot log in.
    #[instrument(skip(self, ctx), fields(caller = ctx.user_id))]
    pub async fn set_blocked(&self, ctx: &AuthContext, user_id: i64, blocked: bool) -> Result<(), ServiceError> {
        require_admin(ctx)?;
        if !self.repo.set_active(user_id, !blocked).await? {
            return Err(ServiceError::not_found("user"));
        }
        info!(admin_id = ctx.user_id, user_id, blocked, event = "user_block_changed");
        Ok(())
    }

    /// Author display data for the given ids; an empty list never touches the store.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn users_info_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, AuthorInfo>, ServiceError> {
        let ids = distinct_ids(ids.iter().copied());
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.repo.users_info_by_ids(&ids).await
    }
}

fn require_admin(ctx: &AuthContext) -> Result<(), ServiceError> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("administrator role required".into()))
    }
}
