//! YouTube caption source using yt-dlp for metadata and track discovery.

use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::sleep;

use super::{
    CaptionKind, CaptionSource, RawCaptions, Thumbnail, VideoExtraction, VideoMetadata,
};
use crate::Result;

/// Manual subtitle languages, in preference order.
const SUBTITLE_PRIORITIES: &[&str] = &["en-US", "en-CA", "en", "en-GB", "en-AU"];

/// Auto caption languages; `en-orig` is the untranslated original track.
const AUTO_CAPTION_PRIORITIES: &[&str] = &["en-orig", "en-US", "en-CA", "en", "en-GB", "en-AU"];

const DOWNLOAD_MAX_RETRIES: u32 = 3;
const DOWNLOAD_RETRY_DELAY_SECONDS: u64 = 5;

/// YouTube caption and metadata source
pub struct YoutubeSource {
    yt_dlp_path: String,
    client: reqwest::Client,
}

impl YoutubeSource {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> Result<bool> {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        Ok(output.map(|out| out.status.success()).unwrap_or(false))
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", "--skip-download", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error);
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str)?;

        Ok(info)
    }

    /// Download caption content, retrying with exponential backoff when
    /// YouTube rate-limits the caption endpoint.
    async fn download_captions(&self, url: &str) -> Result<String> {
        for attempt in 0..DOWNLOAD_MAX_RETRIES {
            tracing::debug!(attempt = attempt + 1, "downloading captions");

            let response = self.client.get(url).send().await?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
                && attempt + 1 < DOWNLOAD_MAX_RETRIES
            {
                let wait = DOWNLOAD_RETRY_DELAY_SECONDS * 2u64.pow(attempt);
                tracing::warn!("rate limited downloading captions, waiting {}s", wait);
                sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if !response.status().is_success() {
                anyhow::bail!("Failed to download captions: HTTP {}", response.status());
            }

            let content = response.text().await?;
            tracing::debug!(chars = content.len(), "downloaded caption content");
            return Ok(content);
        }

        anyhow::bail!("Failed to download captions after {} attempts", DOWNLOAD_MAX_RETRIES)
    }
}

#[async_trait]
impl CaptionSource for YoutubeSource {
    async fn fetch(&self, url: &str) -> Result<VideoExtraction> {
        if !self.check_availability().await? {
            anyhow::bail!(
                "yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp"
            );
        }

        let info = self.get_video_info(url).await?;
        let metadata = metadata_from_info(&info);

        tracing::info!(
            video_id = %metadata.id,
            duration = metadata.duration,
            "fetched video info"
        );

        let captions = match select_caption_track(&info) {
            Some(track) => {
                let content = self.download_captions(&track.url).await?;
                Some(RawCaptions {
                    content,
                    language: track.language,
                    kind: track.kind,
                })
            }
            None => {
                tracing::warn!(video_id = %metadata.id, "no English captions available");
                None
            }
        };

        Ok(VideoExtraction { metadata, captions })
    }

    fn supports_url(&self, url: &str) -> bool {
        let url_lower = url.to_lowercase();
        url_lower.contains("youtube.com/watch")
            || url_lower.contains("youtu.be/")
            || url_lower.contains("youtube.com/embed/")
            || url_lower.contains("youtube.com/v/")
            || url_lower.contains("m.youtube.com/")
    }

    fn source_name(&self) -> &'static str {
        "YouTube"
    }
}

impl Default for YoutubeSource {
    fn default() -> Self {
        Self::new()
    }
}

/// A selected caption track, ready to download.
#[derive(Debug, Clone)]
struct SelectedTrack {
    url: String,
    language: String,
    kind: CaptionKind,
}

/// Pick the best caption track: manual subtitles first (preferred languages,
/// then any `en-*` variant), then auto captions the same way. VTT only;
/// streaming-protocol tracks are skipped.
fn select_caption_track(info: &Value) -> Option<SelectedTrack> {
    if let Some(track) = pick_language_track(
        info.get("subtitles"),
        SUBTITLE_PRIORITIES,
        CaptionKind::Manual,
    ) {
        return Some(track);
    }

    pick_language_track(
        info.get("automatic_captions"),
        AUTO_CAPTION_PRIORITIES,
        CaptionKind::Auto,
    )
}

fn pick_language_track(
    tracks: Option<&Value>,
    priorities: &[&str],
    kind: CaptionKind,
) -> Option<SelectedTrack> {
    let map = tracks?.as_object()?;
    if map.is_empty() {
        return None;
    }

    for lang in priorities {
        if let Some(track) = map.get(*lang).and_then(|t| vtt_url(t)) {
            return Some(SelectedTrack {
                url: track,
                language: (*lang).to_string(),
                kind,
            });
        }
    }

    // Fall back to any English variant.
    for (lang, track) in map {
        if (lang.starts_with("en-") || lang.starts_with("en_")) && vtt_url(track).is_some() {
            return Some(SelectedTrack {
                url: vtt_url(track)?,
                language: lang.clone(),
                kind,
            });
        }
    }

    None
}

/// URL of the VTT format entry in one language's track list.
fn vtt_url(track: &Value) -> Option<String> {
    track.as_array()?.iter().find_map(|entry| {
        if entry.get("protocol").and_then(Value::as_str) == Some("m3u8_native") {
            return None;
        }
        if entry.get("ext").and_then(Value::as_str) != Some("vtt") {
            return None;
        }
        entry.get("url").and_then(Value::as_str).map(String::from)
    })
}

fn metadata_from_info(info: &Value) -> VideoMetadata {
    VideoMetadata {
        id: string_field(info, "id"),
        title: string_field(info, "title"),
        description: string_field(info, "description"),
        duration: info.get("duration").and_then(Value::as_u64).unwrap_or(0),
        upload_date: string_field(info, "upload_date"),
        channel: string_field(info, "channel"),
        channel_id: string_field(info, "channel_id"),
        view_count: info.get("view_count").and_then(Value::as_u64).unwrap_or(0),
        thumbnails: best_thumbnails(info.get("thumbnails")),
    }
}

fn string_field(info: &Value, key: &str) -> String {
    info.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Best three thumbnails, preferring YouTube-hosted ones sorted by area.
fn best_thumbnails(thumbnails: Option<&Value>) -> Vec<Thumbnail> {
    let Some(list) = thumbnails.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut parsed: Vec<Thumbnail> = list
        .iter()
        .filter_map(|t| {
            Some(Thumbnail {
                url: t.get("url")?.as_str()?.to_string(),
                width: t.get("width").and_then(Value::as_u64).map(|w| w as u32),
                height: t.get("height").and_then(Value::as_u64).map(|h| h as u32),
            })
        })
        .collect();

    let hosted: Vec<Thumbnail> = parsed
        .iter()
        .filter(|t| t.url.contains("i.ytimg.com/vi"))
        .cloned()
        .collect();

    if !hosted.is_empty() {
        parsed = hosted;
        parsed.sort_by_key(|t| {
            std::cmp::Reverse(u64::from(t.width.unwrap_or(0)) * u64::from(t.height.unwrap_or(0)))
        });
    }

    parsed.truncate(3);
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_supports_various_youtube_urls() {
        let source = YoutubeSource::new();
        assert!(source.supports_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(source.supports_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(source.supports_url("https://m.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!source.supports_url("https://vimeo.com/12345"));
    }

    #[test]
    fn test_manual_subtitles_preferred_over_auto() {
        let info = json!({
            "subtitles": {
                "en": [{"ext": "vtt", "url": "https://example.com/manual.vtt"}]
            },
            "automatic_captions": {
                "en-orig": [{"ext": "vtt", "url": "https://example.com/auto.vtt"}]
            }
        });

        let track = select_caption_track(&info).unwrap();
        assert_eq!(track.kind, CaptionKind::Manual);
        assert_eq!(track.url, "https://example.com/manual.vtt");
    }

    #[test]
    fn test_auto_caption_priority_prefers_en_orig() {
        let info = json!({
            "automatic_captions": {
                "en": [{"ext": "vtt", "url": "https://example.com/en.vtt"}],
                "en-orig": [{"ext": "vtt", "url": "https://example.com/orig.vtt"}]
            }
        });

        let track = select_caption_track(&info).unwrap();
        assert_eq!(track.language, "en-orig");
        assert_eq!(track.kind, CaptionKind::Auto);
    }

    #[test]
    fn test_english_variant_fallback() {
        let info = json!({
            "subtitles": {
                "en-IE": [{"ext": "vtt", "url": "https://example.com/ie.vtt"}]
            }
        });

        let track = select_caption_track(&info).unwrap();
        assert_eq!(track.language, "en-IE");
    }

    #[test]
    fn test_non_vtt_and_streaming_tracks_skipped() {
        let info = json!({
            "subtitles": {
                "en": [
                    {"ext": "srv3", "url": "https://example.com/a.srv3"},
                    {"ext": "vtt", "protocol": "m3u8_native", "url": "https://example.com/a.m3u8"}
                ]
            }
        });

        assert!(select_caption_track(&info).is_none());
    }

    #[test]
    fn test_no_captions_at_all() {
        assert!(select_caption_track(&json!({})).is_none());
    }

    #[test]
    fn test_metadata_from_info() {
        let info = json!({
            "id": "dQw4w9WgXcQ",
            "title": "A Cooking Video",
            "duration": 372,
            "upload_date": "20250101",
            "channel": "Test Kitchen",
            "channel_id": "UC123",
            "view_count": 4200
        });

        let metadata = metadata_from_info(&info);
        assert_eq!(metadata.id, "dQw4w9WgXcQ");
        assert_eq!(metadata.duration, 372);
        assert_eq!(metadata.view_count, 4200);
    }

    #[test]
    fn test_best_thumbnails_prefers_hosted_and_largest() {
        let info = json!([
            {"url": "https://other.example.com/t.jpg", "width": 9999, "height": 9999},
            {"url": "https://i.ytimg.com/vi/x/small.jpg", "width": 120, "height": 90},
            {"url": "https://i.ytimg.com/vi/x/large.jpg", "width": 1280, "height": 720}
        ]);

        let thumbs = best_thumbnails(Some(&info));
        assert_eq!(thumbs.len(), 2);
        assert!(thumbs[0].url.ends_with("large.jpg"));
    }
}
