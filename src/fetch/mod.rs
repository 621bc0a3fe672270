//! Caption and metadata fetching from supported platforms.
//!
//! Each platform implements [`CaptionSource`]; the [`SourceRegistry`] picks
//! the right one for a given input, with local `.vtt` files handled as a
//! special case.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod local;
pub mod youtube;

use crate::Result;

/// Video metadata as reported by the source platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Total duration in whole seconds
    #[serde(default)]
    pub duration: u64,

    #[serde(default)]
    pub upload_date: String,

    #[serde(default)]
    pub channel: String,

    #[serde(default)]
    pub channel_id: String,

    #[serde(default)]
    pub view_count: u64,

    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,
}

/// Whether a caption track was authored or machine-generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionKind {
    Manual,
    Auto,
}

impl CaptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionKind::Manual => "manual",
            CaptionKind::Auto => "auto-generated",
        }
    }
}

/// Raw caption content as downloaded, before any parsing.
#[derive(Debug, Clone)]
pub struct RawCaptions {
    pub content: String,
    pub language: String,
    pub kind: CaptionKind,
}

/// Everything a source returns for one video.
#[derive(Debug, Clone)]
pub struct VideoExtraction {
    pub metadata: VideoMetadata,

    /// `None` when the video has no usable English captions
    pub captions: Option<RawCaptions>,
}

/// Trait for fetching captions and metadata from a platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch metadata and raw captions for a video URL
    async fn fetch(&self, url: &str) -> Result<VideoExtraction>;

    /// Check if this source supports the given URL
    fn supports_url(&self, url: &str) -> bool;

    /// Get the name of this platform
    fn source_name(&self) -> &'static str;
}

/// Registry for managing multiple caption sources.
pub struct SourceRegistry {
    sources: Vec<Box<dyn CaptionSource>>,
}

impl SourceRegistry {
    /// Create a new registry with default sources
    pub fn new() -> Self {
        let mut registry = Self {
            sources: Vec::new(),
        };
        registry.register(Box::new(youtube::YoutubeSource::new()));
        registry
    }

    /// Create an empty registry (used with explicitly registered sources)
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Register a new source
    pub fn register(&mut self, source: Box<dyn CaptionSource>) {
        self.sources.push(source);
    }

    /// Find a source that supports the given URL
    pub fn find_source(&self, url: &str) -> Option<&dyn CaptionSource> {
        self.sources
            .iter()
            .find(|source| source.supports_url(url))
            .map(|boxed| boxed.as_ref())
    }

    /// List all supported platforms
    pub fn list_platforms(&self) -> Vec<&'static str> {
        self.sources
            .iter()
            .map(|source| source.source_name())
            .collect()
    }

    /// Check if input is a local caption file path rather than a URL
    pub fn is_local_file(&self, input: &str) -> bool {
        if input.starts_with("http://") || input.starts_with("https://") {
            return false;
        }

        let path = std::path::Path::new(input);
        path.exists()
            || path.extension().is_some()
            || input.contains('/')
            || input.contains('\\')
    }

    /// Stable video id for an input: the platform id for URLs, the file stem
    /// for local caption files.
    pub fn video_id(&self, input: &str) -> Result<String> {
        if self.is_local_file(input) {
            return local::video_id_for_path(input);
        }
        crate::utils::extract_video_id(input)
    }

    /// Fetch using the appropriate source
    pub async fn fetch(&self, input: &str) -> Result<VideoExtraction> {
        if self.is_local_file(input) {
            return local::LocalCaptionSource::new().fetch(input).await;
        }

        let source = self
            .find_source(input)
            .ok_or_else(|| anyhow::anyhow!("No caption source found for URL: {}", input))?;

        source.fetch(input).await
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_youtube() {
        let registry = SourceRegistry::new();
        assert_eq!(registry.list_platforms(), vec!["YouTube"]);
    }

    #[test]
    fn test_is_local_file() {
        let registry = SourceRegistry::new();
        assert!(registry.is_local_file("captions/video.vtt"));
        assert!(registry.is_local_file("./video.vtt"));
        assert!(!registry.is_local_file("https://www.youtube.com/watch?v=abc"));
    }

    #[test]
    fn test_find_source_for_youtube_url() {
        let registry = SourceRegistry::new();
        assert!(registry
            .find_source("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .is_some());
        assert!(registry.find_source("https://example.com/video").is_none());
    }
}
