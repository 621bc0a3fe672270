//! Persistent extraction cache.
//!
//! Extraction payloads are stored as gzip-compressed JSON, either on the
//! local filesystem or in S3. A missing or unreadable entry is a cache miss,
//! never an error.

use std::io::{Read, Write};

use async_trait::async_trait;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::pipeline::ExtractionData;
use crate::Result;

pub mod local;
pub mod s3;

pub use local::LocalCache;
pub use s3::S3Cache;

/// Trait for extraction cache backends
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a cached extraction by video id
    async fn get(&self, video_id: &str) -> Result<Option<ExtractionData>>;

    /// Store an extraction result
    async fn put(&self, video_id: &str, data: &ExtractionData) -> Result<()>;
}

pub(crate) fn encode_entry(data: &ExtractionData) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(data)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

pub(crate) fn decode_entry(bytes: &[u8]) -> Result<ExtractionData> {
    let mut decoder = GzDecoder::new(bytes);
    let mut json = String::new();
    decoder.read_to_string(&mut json)?;
    Ok(serde_json::from_str(&json)?)
}
