//! S3 media store

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;

use super::{MediaError, MediaStore, validate_key};

pub struct S3MediaStore {
    client: S3Client,
    bucket: String,
    base_url: String,
}

impl S3MediaStore {
    pub fn new(client: S3Client, bucket: String, base_url: &str) -> Self {
        Self {
            client,
            bucket,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client from the default AWS credential chain
    pub async fn from_env(bucket: String, base_url: &str) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(S3Client::new(&aws_config), bucket, base_url)
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), MediaError> {
        validate_key(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| MediaError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, MediaError> {
        validate_key(key)?;
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    MediaError::NotFound(key.to_string())
                } else {
                    MediaError::Backend(e.to_string())
                }
            })?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| MediaError::Backend(e.to_string()))?;
        Ok(bytes.into_bytes().to_vec())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
