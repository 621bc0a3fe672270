//! S3-backed extraction cache, keyed `{prefix}{video_id}.json.gz`.

use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use super::{decode_entry, encode_entry, CacheStore};
use crate::config::Config;
use crate::pipeline::ExtractionData;
use crate::Result;

pub struct S3Cache {
    client: S3Client,
    bucket: String,
    key_prefix: String,
}

impl S3Cache {
    pub async fn new(config: &Config) -> Result<Self> {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(config.aws_region())
            .load()
            .await;

        Ok(Self {
            client: S3Client::new(&aws_config),
            bucket: config.aws.s3_bucket.clone(),
            key_prefix: config.aws.s3_key_prefix.clone().unwrap_or_default(),
        })
    }

    fn key(&self, video_id: &str) -> String {
        format!("{}{}.json.gz", self.key_prefix, video_id)
    }
}

#[async_trait]
impl CacheStore for S3Cache {
    async fn get(&self, video_id: &str) -> Result<Option<ExtractionData>> {
        let key = self.key(video_id);

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    return Ok(None);
                }
                // Original behavior: a failed cache check degrades to a miss.
                tracing::warn!(video_id, %service, "cache check failed");
                return Ok(None);
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .context("Failed to read cached object body")?
            .into_bytes();

        match decode_entry(&bytes) {
            Ok(data) => Ok(Some(data)),
            Err(err) => {
                tracing::warn!(video_id, %err, "unreadable cache entry, treating as miss");
                Ok(None)
            }
        }
    }

    async fn put(&self, video_id: &str, data: &ExtractionData) -> Result<()> {
        let bytes = encode_entry(data)?;
        let key = self.key(video_id);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type("application/json")
            .content_encoding("gzip")
            .send()
            .await
            .context("Failed to write cache entry to S3")?;

        tracing::debug!(video_id, %key, "wrote cache entry to S3");
        Ok(())
    }
}
