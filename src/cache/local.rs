//! Filesystem cache: one gzip JSON file per video under the cache directory.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use super::{decode_entry, encode_entry, CacheStore};
use crate::pipeline::ExtractionData;
use crate::utils::sanitize_filename;
use crate::{Result, StepscribeError};

pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    /// Open (creating if needed) a cache directory; defaults to the platform
    /// cache dir.
    pub fn new(dir: Option<PathBuf>) -> Result<Self> {
        let dir = match dir {
            Some(dir) => dir,
            None => dirs::cache_dir()
                .context("Could not determine cache directory")?
                .join("stepscribe"),
        };

        fs_err::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn entry_path(&self, video_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json.gz", sanitize_filename(video_id)))
    }
}

#[async_trait]
impl CacheStore for LocalCache {
    async fn get(&self, video_id: &str) -> Result<Option<ExtractionData>> {
        let path = self.entry_path(video_id);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs_err::read(&path)?;
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

        // Write-then-rename so readers never observe a partial entry.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(self.entry_path(video_id))
            .map_err(|err| StepscribeError::CacheError(err.to_string()))?;

        tracing::debug!(video_id, bytes = bytes.len(), "wrote cache entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::sample_entry;

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(Some(dir.path().to_path_buf())).unwrap();
        let entry = sample_entry();

        tokio_test::block_on(async {
            cache.put("dQw4w9WgXcQ", &entry).await.unwrap();
            let got = cache.get("dQw4w9WgXcQ").await.unwrap().unwrap();
            assert_eq!(got.metadata.id, "dQw4w9WgXcQ");
        });
    }

    #[test]
    fn test_get_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(Some(dir.path().to_path_buf())).unwrap();

        tokio_test::block_on(async {
            assert!(cache.get("nope").await.unwrap().is_none());
        });
    }

    #[test]
    fn test_corrupt_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(Some(dir.path().to_path_buf())).unwrap();
        fs_err::write(dir.path().join("bad.json.gz"), b"not gzip at all").unwrap();

        tokio_test::block_on(async {
            assert!(cache.get("bad").await.unwrap().is_none());
        });
    }
}
