pub mod auth;
pub mod errors;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::{build_blog_router, build_stakeholders_router, run_blog_service, run_stakeholders_service};
