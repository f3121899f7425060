//! Blogs, comments and likes, plus the feed assembled from them.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::BlogService;
