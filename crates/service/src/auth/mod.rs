//! Auth module: registration, login and bearer-token handling.
//!
//! Persistence goes through [`crate::users::repository::UserRepository`]; signing keys are
//! built once from configuration and handed to whoever needs them.

pub mod domain;
pub mod errors;
pub mod service;
pub mod token;

pub use domain::{AuthContext, Role};
pub use service::AuthService;
pub use token::TokenKeys;
