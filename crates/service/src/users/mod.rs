//! Stakeholders: accounts, profiles, positions and the batch author lookup.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::UserService;
