use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{public_url, ObjectStore, StorageError};

/// In-memory store for tests and local runs without MinIO.
#[derive(Default)]
pub struct InMemoryObjectStore {
    base_url: String,
    objects: Mutex<HashMap<(String, String), Bytes>>,
    fail: bool,
}

impl InMemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    /// A store whose every upload fails.
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(&(bucket.to_string(), key.to_string())).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        _content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        if self.fail {
            return Err(StorageError::Upload("store unavailable".into()));
        }
        self.objects.lock().unwrap().insert((bucket.to_string(), key.to_string()), body);
        Ok(public_url(&self.base_url, bucket, key))
    }
}
