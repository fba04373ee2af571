//! S3 blob source.

use crate::error::remote_error;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use sealcache_core::{BlobSource, RemoteCall, RemoteError, ServiceTarget};
use tracing::debug;

/// Fetches encrypted objects with `GetObject`.
#[derive(Clone)]
pub struct S3BlobSource {
    client: Client,
}

impl S3BlobSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlobSource for S3BlobSource {
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RemoteError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| remote_error(RemoteCall::GetObject, &err))?;

        let body = output.body.collect().await.map_err(|err| {
            RemoteError::new(RemoteCall::GetObject, format!("reading object body: {err}"))
        })?;
        let bytes = body.into_bytes().to_vec();
        debug!(bucket, key, size = bytes.len(), "Fetched object");
        Ok(bytes)
    }

    fn target(&self) -> ServiceTarget {
        ServiceTarget::new("aws-sdk-s3", "S3")
    }
}
