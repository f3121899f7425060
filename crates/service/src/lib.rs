//! Service layer shared by the blog and stakeholders services.
//! - Business rules live here, independent of the HTTP framework.
//! - Persistence sits behind repository traits with sea-orm and in-memory implementations.
//! - Peer lookups and object storage sit behind traits so handlers can be tested without network.

pub mod errors;
pub mod auth;
pub mod users;
pub mod blogs;
pub mod aggregation;
pub mod storage;
#[cfg(test)]
pub mod test_support;
