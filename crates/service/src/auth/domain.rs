use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role. Only guides and tourists may register themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guide,
    Tourist,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guide => "guide",
            Role::Tourist => "tourist",
            Role::Administrator => "administrator",
        }
    }

    pub fn is_self_assignable(&self) -> bool {
        !matches!(self, Role::Administrator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guide" => Ok(Role::Guide),
            "tourist" => Ok(Role::Tourist),
            "administrator" => Ok(Role::Administrator),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Registration input. `role` stays a string so unknown values can be reported as 400.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Login result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginOutput {
    pub token: String,
}

/// Identity extracted from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: Role,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_values_only() {
        assert_eq!("guide".parse::<Role>().unwrap(), Role::Guide);
        assert_eq!("administrator".parse::<Role>().unwrap(), Role::Administrator);
        assert!("Guide".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn administrator_is_not_self_assignable() {
        assert!(Role::Tourist.is_self_assignable());
        assert!(!Role::Administrator.is_self_assignable());
    }
}
