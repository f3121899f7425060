use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use tracing::error;

use crate::aggregation::AuthorInfo;
use crate::errors::ServiceError;
use crate::users::domain::{NewUser, Position, Profile, ProfileInput, UserRecord, UserSummary};
use crate::users::repository::UserRepository;
use models::{profile, user};

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn exists(&self, user_id: i64) -> Result<bool, ServiceError> {
        Ok(user::Entity::find_by_id(user_id).count(&self.db).await? > 0)
    }
}

fn to_record(m: user::Model) -> Result<UserRecord, ServiceError> {
    let role = m.role.parse().map_err(|e: String| {
        error!(user_id = m.id, role = %m.role, "stored role is invalid");
        ServiceError::Db(e)
    })?;
    Ok(UserRecord {
        id: m.id,
        username: m.username,
        password_hash: m.password,
        email: m.email,
        role,
        is_active: m.is_active,
    })
}

fn to_profile(m: profile::Model) -> Profile {
    Profile {
        id: m.id,
        user_id: m.user_id,
        first_name: m.first_name,
        last_name: m.last_name,
        profile_image_url: m.profile_image_url,
        biography: m.biography,
        motto: m.motto,
    }
}

fn map_insert_err(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict("Username or email is already registered".into())
        }
        _ => ServiceError::Db(e.to_string()),
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, ServiceError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .map(to_record)
            .transpose()
    }

    async fn email_taken(&self, email: &str) -> Result<bool, ServiceError> {
        Ok(user::Entity::find().filter(user::Column::Email.eq(email)).count(&self.db).await? > 0)
    }

    async fn create_user(&self, new: NewUser) -> Result<UserRecord, ServiceError> {
        let am = user::ActiveModel {
            username: Set(new.username),
            password: Set(new.password_hash),
            email: Set(new.email),
            role: Set(new.role.as_str().to_string()),
            is_active: Set(true),
            latitude: Set(None),
            longitude: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let created = am.insert(&self.db).await.map_err(map_insert_err)?;
        to_record(created)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, ServiceError> {
        let rows = user::Entity::find().order_by_asc(user::Column::Id).all(&self.db).await?;
        rows.into_iter().map(|m| to_record(m).map(|r| UserSummary::from(&r))).collect()
    }

    async fn set_active(&self, user_id: i64, active: bool) -> Result<bool, ServiceError> {
        let res = user::Entity::update_many()
            .col_expr(user::Column::IsActive, Expr::value(active))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await?;
        // MySQL may count only changed rows; an unchanged match still means the user exists.
        if res.rows_affected > 0 {
            return Ok(true);
        }
        self.exists(user_id).await
    }

    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>, ServiceError> {
        let found = profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(found.map(to_profile))
    }

    async fn upsert_profile(&self, user_id: i64, input: ProfileInput) -> Result<(), ServiceError> {
        let am = profile::ActiveModel {
            user_id: Set(user_id),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            profile_image_url: Set(input.profile_image_url),
            biography: Set(input.biography),
            motto: Set(input.motto),
            ..Default::default()
        };
        profile::Entity::insert(am)
            .on_conflict(
                OnConflict::column(profile::Column::UserId)
                    .update_columns([
                        profile::Column::FirstName,
                        profile::Column::LastName,
                        profile::Column::ProfileImageUrl,
                        profile::Column::Biography,
                        profile::Column::Motto,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn set_profile_image(&self, user_id: i64, url: &str) -> Result<(), ServiceError> {
        let am = profile::ActiveModel {
            user_id: Set(user_id),
            profile_image_url: Set(Some(url.to_string())),
            ..Default::default()
        };
        profile::Entity::insert(am)
            .on_conflict(
                OnConflict::column(profile::Column::UserId)
                    .update_column(profile::Column::ProfileImageUrl)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn get_position(&self, user_id: i64) -> Result<Option<Position>, ServiceError> {
        let found = user::Entity::find_by_id(user_id).one(&self.db).await?;
        Ok(found.map(|u| Position { latitude: u.latitude, longitude: u.longitude }))
    }

    async fn set_position(&self, user_id: i64, latitude: f64, longitude: f64) -> Result<bool, ServiceError> {
        let res = user::Entity::update_many()
            .col_expr(user::Column::Latitude, Expr::value(latitude))
            .col_expr(user::Column::Longitude, Expr::value(longitude))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await?;
        if res.rows_affected > 0 {
            return Ok(true);
        }
        self.exists(user_id).await
    }

    async fn users_info_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, AuthorInfo>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .find_also_related(profile::Entity)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(u, p)| {
                let (first_name, profile_image_url) = match p {
                    Some(p) => (p.first_name, p.profile_image_url),
                    None => (None, None),
                };
                (u.id, AuthorInfo { username: u.username, first_name, profile_image_url })
            })
            .collect())
    }
}
