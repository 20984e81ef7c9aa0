//! Object storage seam — generated images land here under the
//! `cron_generated/` prefix.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::config::Config;
use crate::errors::AppError;

/// Pluggable asset store. Carried as `Arc<dyn AssetStore>` so the image
/// stage can be exercised with a mock in tests.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Writes bytes under `key` and returns the public URL.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, AppError>;
}

pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
}

impl S3Store {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, endpoint: String) -> Self {
        Self {
            client,
            bucket,
            endpoint,
        }
    }
}

#[async_trait]
impl AssetStore for S3Store {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed for '{key}': {e}")))?;

        info!("Uploaded asset to s3://{}/{}", self.bucket, key);
        Ok(format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.bucket,
            key
        ))
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
pub async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "content-worker-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
