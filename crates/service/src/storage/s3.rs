use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::{debug, instrument};

use super::{public_url, ObjectStore, StorageError};

/// S3-compatible store (MinIO in development). Path-style addressing so the
/// bucket is part of the URL path, matching the public URL format.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    public_base_url: String,
}

impl S3ObjectStore {
    pub async fn from_config(cfg: &configs::StorageConfig) -> Result<Self, StorageError> {
        if cfg.endpoint.trim().is_empty() {
            return Err(StorageError::Config("storage.endpoint is empty".into()));
        }
        let credentials = Credentials::new(&cfg.access_key, &cfg.secret_key, None, None, "tourism-services");

        let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let conf = aws_sdk_s3::config::Builder::from(&shared_config)
            .endpoint_url(cfg.endpoint.trim())
            .force_path_style(true)
            .build();

        Ok(Self { client: Client::from_conf(conf), public_base_url: cfg.public_base_url.clone() })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self, body), fields(size = body.len()))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let mut req = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(body));
        if let Some(ct) = content_type {
            req = req.content_type(ct);
        }
        req.send().await.map_err(|e| StorageError::Upload(format!("{bucket}/{key}: {e}")))?;
        debug!(bucket, key, "object stored");
        Ok(public_url(&self.public_base_url, bucket, key))
    }
}
