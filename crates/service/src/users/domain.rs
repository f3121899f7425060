use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::errors::ServiceError;

/// Account row as needed by auth workflows.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: Role,
}

/// Account as shown to administrators; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<&UserRecord> for UserSummary {
    fn from(u: &UserRecord) -> Self {
        Self { id: u.id, username: u.username.clone(), email: u.email.clone(), role: u.role, is_active: u.is_active }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub biography: Option<String>,
    pub motto: Option<String>,
}

/// Body of `PUT /profile`. The whole profile is replaced; absent fields become null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub biography: Option<String>,
    pub motto: Option<String>,
}

/// Last known position; both halves are null until first set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionInput {
    pub latitude: f64,
    pub longitude: f64,
}

impl PositionInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(ServiceError::Validation("latitude must be between -90 and 90".into()));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(ServiceError::Validation("longitude must be between -180 and 180".into()));
        }
        Ok(())
    }
}

/// Parse the `ids` query value of the batch endpoint (`"1,2,3"`).
/// Blank input yields an empty list; whitespace around entries is ignored.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, ServiceError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(|_| ServiceError::Validation(format!("invalid user id: {s}"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_parsing() {
        assert_eq!(parse_id_list("1,2, 3").unwrap(), vec![1, 2, 3]);
        assert!(parse_id_list("").unwrap().is_empty());
        assert!(parse_id_list(" , ").unwrap().is_empty());
        assert!(parse_id_list("1,x").is_err());
    }

    #[test]
    fn position_ranges() {
        assert!(PositionInput { latitude: 90.0, longitude: -180.0 }.validate().is_ok());
        assert!(PositionInput { latitude: 90.5, longitude: 0.0 }.validate().is_err());
        assert!(PositionInput { latitude: 0.0, longitude: 180.01 }.validate().is_err());
        assert!(PositionInput { latitude: f64::NAN, longitude: 0.0 }.validate().is_err());
    }

    #[test]
    fn profile_input_tolerates_missing_fields() {
        let p: ProfileInput = serde_json::from_str(r#"{"firstName":"Ana"}"#).unwrap();
        assert_eq!(p.first_name.as_deref(), Some("Ana"));
        assert_eq!(p.motto, None);
    }
}
