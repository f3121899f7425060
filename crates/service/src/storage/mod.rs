//! Object storage for uploaded images.
//!
//! Only the public URL of an object is persisted; the bytes live in an
//! S3-compatible bucket. Keys are derived from the owner id, a timestamp and,
//! for blog images, a sequence number, so concurrent uploads never collide.

mod memory;
mod s3;

pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub const BLOG_IMAGES_BUCKET: &str = "blog-images";
pub const PROFILE_IMAGES_BUCKET: &str = "user-profiles";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("storage configuration error: {0}")]
    Config(String),
}

/// A file received from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Extension of the original file name including the dot, or empty.
    /// Anything that is not a short alphanumeric suffix is dropped.
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| format!(".{e}"))
            .unwrap_or_default()
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` at `bucket/key` and return its public URL.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, StorageError>;
}

pub fn public_url(base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), bucket, key)
}

pub fn blog_image_key(author_id: i64, unix_nanos: i128, seq: usize, ext: &str) -> String {
    format!("user-{author_id}-blog-{unix_nanos}-image-{seq}{ext}")
}

pub fn profile_image_key(user_id: i64, unix_ts: i64, ext: &str) -> String {
    format!("user-{user_id}-{unix_ts}{ext}")
}
