use std::collections::HashMap;

use async_trait::async_trait;

use super::domain::{NewUser, Position, Profile, ProfileInput, UserRecord, UserSummary};
use crate::aggregation::AuthorInfo;
use crate::errors::ServiceError;

/// Persistence for the stakeholders service.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, ServiceError>;
    async fn email_taken(&self, email: &str) -> Result<bool, ServiceError>;
    /// Unique violations surface as `Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, ServiceError>;
    async fn list_users(&self) -> Result<Vec<UserSummary>, ServiceError>;
    /// `false` when no such user exists.
    async fn set_active(&self, user_id: i64, active: bool) -> Result<bool, ServiceError>;

    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>, ServiceError>;
    async fn upsert_profile(&self, user_id: i64, input: ProfileInput) -> Result<(), ServiceError>;
    async fn set_profile_image(&self, user_id: i64, url: &str) -> Result<(), ServiceError>;

    /// `None` when no such user exists.
    async fn get_position(&self, user_id: i64) -> Result<Option<Position>, ServiceError>;
    /// `false` when no such user exists.
    async fn set_position(&self, user_id: i64, latitude: f64, longitude: f64) -> Result<bool, ServiceError>;

    /// Batched lookup; ids without a user are simply absent from the result.
    async fn users_info_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, AuthorInfo>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<Vec<UserRecord>>,
        profiles: Mutex<HashMap<i64, Profile>>, // key: user_id
        positions: Mutex<HashMap<i64, Position>>, // key: user_id
        info_queries: AtomicUsize,
    }

    impl MockUserRepository {
        /// Insert a user directly, bypassing registration rules (e.g. administrators).
        pub fn seed(&self, user: NewUser) -> UserRecord {
            let mut users = self.users.lock().unwrap();
            let rec = UserRecord {
                id: users.len() as i64 + 1,
                username: user.username,
                password_hash: user.password_hash,
                email: user.email,
                role: user.role,
                is_active: true,
            };
            users.push(rec.clone());
            rec
        }

        /// Number of batch lookups that reached the repository.
        pub fn info_queries(&self) -> usize {
            self.info_queries.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, ServiceError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.username == username).cloned())
        }

        async fn email_taken(&self, email: &str) -> Result<bool, ServiceError> {
            Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
        }

        async fn create_user(&self, user: NewUser) -> Result<UserRecord, ServiceError> {
            {
                let users = self.users.lock().unwrap();
                if users.iter().any(|u| u.username == user.username || u.email == user.email) {
                    return Err(ServiceError::Conflict("Username or email is already registered".into()));
                }
            }
            Ok(self.seed(user))
        }

        async fn list_users(&self) -> Result<Vec<UserSummary>, ServiceError> {
            Ok(self.users.lock().unwrap().iter().map(UserSummary::from).collect())
        }

        async fn set_active(&self, user_id: i64, active: bool) -> Result<bool, ServiceError> {
            let mut users = self.users.lock().unwrap();
            match users.iter_mut().find(|u| u.id == user_id) {
                Some(u) => {
                    u.is_active = active;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>, ServiceError> {
            Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
        }

        async fn upsert_profile(&self, user_id: i64, input: ProfileInput) -> Result<(), ServiceError> {
            let mut profiles = self.profiles.lock().unwrap();
            let next_id = profiles.len() as i64 + 1;
            let id = profiles.get(&user_id).map(|p| p.id).unwrap_or(next_id);
            profiles.insert(
                user_id,
                Profile {
                    id,
                    user_id,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    profile_image_url: input.profile_image_url,
                    biography: input.biography,
                    motto: input.motto,
                },
            );
            Ok(())
        }

        async fn set_profile_image(&self, user_id: i64, url: &str) -> Result<(), ServiceError> {
            let mut profiles = self.profiles.lock().unwrap();
            let next_id = profiles.len() as i64 + 1;
            let entry = profiles.entry(user_id).or_insert_with(|| Profile {
                id: next_id,
                user_id,
                first_name: None,
                last_name: None,
                profile_image_url: None,
                biography: None,
                motto: None,
            });
            entry.profile_image_url = Some(url.to_string());
            Ok(())
        }

        async fn get_position(&self, user_id: i64) -> Result<Option<Position>, ServiceError> {
            if !self.users.lock().unwrap().iter().any(|u| u.id == user_id) {
                return Ok(None);
            }
            Ok(Some(self.positions.lock().unwrap().get(&user_id).copied().unwrap_or_default()))
        }

        async fn set_position(&self, user_id: i64, latitude: f64, longitude: f64) -> Result<bool, ServiceError> {
            if !self.users.lock().unwrap().iter().any(|u| u.id == user_id) {
                return Ok(false);
            }
            self.positions
                .lock()
                .unwrap()
                .insert(user_id, Position { latitude: Some(latitude), longitude: Some(longitude) });
            Ok(true)
        }

        async fn users_info_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, AuthorInfo>, ServiceError> {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }
            self.info_queries.fetch_add(1, Ordering::SeqCst);
            let users = self.users.lock().unwrap();
            let profiles = self.profiles.lock().unwrap();
            Ok(users
                .iter()
                .filter(|u| ids.contains(&u.id))
                .map(|u| {
                    let p = profiles.get(&u.id);
                    (
                        u.id,
                        AuthorInfo {
                            username: u.username.clone(),
                            first_name: p.and_then(|p| p.first_name.clone()),
                            profile_image_url: p.and_then(|p| p.profile_image_url.clone()),
                        },
                    )
                })
                .collect())
        }
    }
}
