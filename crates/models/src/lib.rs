//! sea-orm entities for both services plus connection helpers.
//!
//! Stakeholders tables: [`user`], [`profile`].
//! Blog tables: [`blog`], [`blog_image`], [`comment`], [`like`].
pub mod errors;
pub mod db;
pub mod user;
pub mod profile;
pub mod blog;
pub mod blog_image;
pub mod comment;
pub mod like;

#[cfg(test)]
mod tests;
