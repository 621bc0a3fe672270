//! Local caption file source, for `.vtt` files already on disk.

use async_trait::async_trait;
use std::path::Path;

use super::{CaptionKind, CaptionSource, RawCaptions, VideoExtraction, VideoMetadata};
use crate::utils::sanitize_filename;
use crate::Result;

/// Caption source backed by a file on disk. The video id is derived from the
/// file stem and the duration is left at zero for the pipeline to infer from
/// the final cue.
pub struct LocalCaptionSource;

impl LocalCaptionSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalCaptionSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Video id for a local caption file: its sanitized file stem.
pub fn video_id_for_path(input: &str) -> Result<String> {
    let stem = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("Cannot derive a video id from path: {}", input))?;

    Ok(sanitize_filename(stem))
}

#[async_trait]
impl CaptionSource for LocalCaptionSource {
    async fn fetch(&self, url: &str) -> Result<VideoExtraction> {
        let id = video_id_for_path(url)?;
        let content = fs_err::read_to_string(url)?;

        tracing::info!(video_id = %id, chars = content.len(), "read local caption file");

        Ok(VideoExtraction {
            metadata: VideoMetadata {
                id: id.clone(),
                title: id,
                description: String::new(),
                duration: 0,
                upload_date: String::new(),
                channel: String::new(),
                channel_id: String::new(),
                view_count: 0,
                thumbnails: Vec::new(),
            },
            captions: Some(RawCaptions {
                content,
                language: "en".to_string(),
                kind: CaptionKind::Auto,
            }),
        })
    }

    fn supports_url(&self, url: &str) -> bool {
        Path::new(url).exists()
    }

    fn source_name(&self) -> &'static str {
        "Local file"
    }
}
