//! End-to-end orchestration: fetch (or cache), caption processing, recipe
//! keyword alignment, and step time prediction.

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::align::{predict_step_times, KeywordMatcher, SnowballAnalyzer};
use crate::cache::{CacheStore, LocalCache, S3Cache};
use crate::captions::{self, Cue, Segment};
use crate::config::Config;
use crate::fetch::{SourceRegistry, VideoMetadata};
use crate::recipe::{Recipe, RecipeExtractor};
use crate::{Result, StepscribeError};

/// Cached extraction payload for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionData {
    pub metadata: VideoMetadata,

    /// `None` when the video has no usable captions
    pub transcript: Option<TranscriptData>,
}

/// Processed transcript in the cache wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptData {
    pub language: String,

    /// "manual" or "auto-generated"
    #[serde(rename = "type")]
    pub kind: String,

    pub segments: Vec<Segment>,

    #[serde(rename = "plainText")]
    pub plain_text: String,
}

/// Per-invocation processing report, returned alongside the payload instead
/// of being accumulated in shared counters.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub run_id: Uuid,
    pub video_id: String,
    pub cache_hit: bool,
    pub cues_parsed: usize,
    pub cues_emitted: usize,
    pub segment_count: usize,
    pub matches_found: usize,
    pub steps_timed: usize,
    pub completed_at: DateTime<Utc>,
}

impl ExtractionReport {
    fn new(video_id: String) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            video_id,
            cache_hit: false,
            cues_parsed: 0,
            cues_emitted: 0,
            segment_count: 0,
            matches_found: 0,
            steps_timed: 0,
            completed_at: Utc::now(),
        }
    }
}

/// Outcome of a batch extraction run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub cached: usize,
    pub failed: Vec<(String, String)>,
}

/// Main alignment pipeline
pub struct AlignmentPipeline {
    config: Config,
    sources: SourceRegistry,
    cache: Box<dyn CacheStore>,
}

impl AlignmentPipeline {
    /// Create a new pipeline; caches in S3 when a bucket is configured,
    /// locally otherwise.
    pub async fn new(config: Config) -> Result<Self> {
        let cache: Box<dyn CacheStore> = if config.aws.s3_bucket.is_empty() {
            Box::new(LocalCache::new(config.app.cache_dir.clone())?)
        } else {
            Box::new(S3Cache::new(&config).await?)
        };

        Ok(Self {
            config,
            sources: SourceRegistry::new(),
            cache,
        })
    }

    /// Create a pipeline from explicit parts.
    pub fn with_parts(config: Config, sources: SourceRegistry, cache: Box<dyn CacheStore>) -> Self {
        Self {
            config,
            sources,
            cache,
        }
    }

    /// Fetch (or load from cache) a video's metadata and processed transcript.
    pub async fn extract(
        &self,
        input: &str,
        skip_cache: bool,
    ) -> Result<(ExtractionData, ExtractionReport)> {
        let video_id = self.sources.video_id(input)?;
        let mut report = ExtractionReport::new(video_id.clone());

        if !skip_cache {
            if let Some(data) = self.cache.get(&video_id).await? {
                tracing::info!(video_id = %video_id, "cache hit");
                report.cache_hit = true;
                report.segment_count = data
                    .transcript
                    .as_ref()
                    .map(|t| t.segments.len())
                    .unwrap_or(0);
                report.completed_at = Utc::now();
                return Ok((data, report));
            }
        }

        tracing::info!(video_id = %video_id, "extracting video");
        let extraction = self.sources.fetch(input).await?;

        let transcript = match extraction.captions {
            Some(raw) => {
                let processed = captions::process(&raw.content)?;
                report.cues_parsed = processed.cues_parsed;
                report.cues_emitted = processed.cues.len();
                report.segment_count = processed.transcript.segments.len();

                Some(TranscriptData {
                    language: raw.language,
                    kind: raw.kind.as_str().to_string(),
                    segments: processed.transcript.segments,
                    plain_text: processed.transcript.plain_text,
                })
            }
            None => None,
        };

        let data = ExtractionData {
            metadata: extraction.metadata,
            transcript,
        };

        // A cache write failure degrades to a warning; the extraction itself
        // succeeded.
        if let Err(err) = self.cache.put(&video_id, &data).await {
            tracing::warn!(video_id = %video_id, %err, "failed to write cache entry");
        }

        report.completed_at = Utc::now();
        Ok((data, report))
    }

    /// Full alignment: extract, then fill each instruction's
    /// `video_references` and `predicted_time`. When `recipe` is `None` the
    /// AI extractor supplies one from the transcript.
    pub async fn align(
        &self,
        input: &str,
        recipe: Option<Recipe>,
        skip_cache: bool,
    ) -> Result<(Recipe, ExtractionReport)> {
        let (data, mut report) = self.extract(input, skip_cache).await?;

        let transcript = data.transcript.as_ref().ok_or_else(|| {
            StepscribeError::NoCaptions(data.metadata.id.clone())
        })?;

        let mut recipe = match recipe {
            Some(recipe) => recipe,
            None => self.extract_recipe(&data.metadata, &transcript.plain_text).await?,
        };

        if recipe.video_id.is_empty() {
            recipe.video_id = data.metadata.id.clone();
        }

        let cues = cues_from_segments(&transcript.segments);
        let analyzer = SnowballAnalyzer::new();
        let matcher = KeywordMatcher::with_threshold(&analyzer, self.config.app.fuzzy_threshold);

        for instruction in &mut recipe.instructions {
            let keywords = instruction.keywords.all();
            instruction.video_references = if keywords.is_empty() {
                Vec::new()
            } else {
                matcher.search(&cues, &keywords)
            };
            report.matches_found += instruction.video_references.len();
        }

        let mut duration = data.metadata.duration;
        if duration == 0 {
            // Local caption files carry no metadata duration; fall back to
            // the end of the final segment.
            duration = transcript
                .segments
                .last()
                .map(|seg| seg.end_time.ceil() as u64)
                .unwrap_or(0);
        }

        predict_step_times(&mut recipe.instructions, duration);
        report.steps_timed = recipe.instructions.len();
        report.completed_at = Utc::now();

        tracing::info!(
            video_id = %report.video_id,
            matches = report.matches_found,
            steps = report.steps_timed,
            "alignment complete"
        );

        Ok((recipe, report))
    }

    /// Extract and cache a list of video URLs with bounded concurrency.
    /// Per-URL failures are collected, not fatal.
    pub async fn extract_batch(
        &self,
        urls: &[String],
        concurrency: usize,
        skip_cache: bool,
    ) -> BatchSummary {
        let progress = ProgressBar::new(urls.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );
        progress.set_message("extracting...");

        let results: Vec<(String, Result<(ExtractionData, ExtractionReport)>)> =
            futures_util::stream::iter(urls.iter().cloned())
                .map(|url| {
                    let progress = progress.clone();
                    async move {
                        let result = self.extract(&url, skip_cache).await;
                        progress.inc(1);
                        (url, result)
                    }
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

        progress.finish_with_message("batch complete");

        let mut summary = BatchSummary::default();
        for (url, result) in results {
            summary.processed += 1;
            match result {
                Ok((_, report)) => {
                    summary.succeeded += 1;
                    if report.cache_hit {
                        summary.cached += 1;
                    }
                }
                Err(err) => {
                    tracing::error!(%url, %err, "batch extraction failed");
                    summary.failed.push((url, err.to_string()));
                }
            }
        }

        summary
    }

    async fn extract_recipe(&self, metadata: &VideoMetadata, plain_text: &str) -> Result<Recipe> {
        let api_key = self.config.openai_api_key().ok_or_else(|| {
            StepscribeError::RecipeExtractionFailed(
                "no OpenAI API key configured (set openai.api_key or OPENAI_API_KEY)".to_string(),
            )
        })?;

        let extractor = RecipeExtractor::new(api_key, self.config.openai.model.clone());
        extractor
            .extract(metadata, plain_text)
            .await?
            .ok_or_else(|| {
                StepscribeError::RecipeExtractionFailed(format!(
                    "no recipe found in video {}",
                    metadata.id
                ))
                .into()
            })
    }
}

/// Rebuild matcher cues from cached segments. Segments are produced
/// one-to-one from deduplicated cues, so no caption round trip is needed.
fn cues_from_segments(segments: &[Segment]) -> Vec<Cue> {
    segments
        .iter()
        .map(|seg| Cue {
            start_ms: (seg.start_time * 1000.0).round() as u64,
            end_ms: (seg.end_time * 1000.0).round() as u64,
            text: seg.text.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{CaptionKind, MockCaptionSource, RawCaptions, VideoExtraction};
    use crate::recipe::{Instruction, KeywordSet};

    const URL: &str = "https://www.youtube.com/watch?v=abc123def45";

    const VTT: &str = "WEBVTT\n\
        \n\
        00:00:10.000 --> 00:00:12.000\n\
        sear the chicken thighs skin side down\n\
        \n\
        00:00:40.000 --> 00:00:43.000\n\
        now we simmer the sauce gently\n\
        \n\
        00:01:10.000 --> 00:01:13.000\n\
        plate everything and garnish with parsley\n";

    fn metadata(duration: u64) -> VideoMetadata {
        VideoMetadata {
            id: "abc123def45".to_string(),
            title: "Chicken Dinner".to_string(),
            description: String::new(),
            duration,
            upload_date: "20250101".to_string(),
            channel: "Test Kitchen".to_string(),
            channel_id: "UC1".to_string(),
            view_count: 0,
            thumbnails: Vec::new(),
        }
    }

    fn extraction_fixture() -> VideoExtraction {
        VideoExtraction {
            metadata: metadata(90),
            captions: Some(RawCaptions {
                content: VTT.to_string(),
                language: "en-orig".to_string(),
                kind: CaptionKind::Auto,
            }),
        }
    }

    fn recipe_fixture() -> Recipe {
        let step = |step: u32, text: &str, techniques: &[&str]| Instruction {
            step,
            text: text.to_string(),
            keywords: KeywordSet {
                ingredients: Vec::new(),
                techniques: techniques.iter().map(|t| t.to_string()).collect(),
                equipment: Vec::new(),
            },
            video_references: Vec::new(),
            predicted_time: None,
        };

        serde_json::from_value(serde_json::json!({
            "title": "Chicken Dinner",
            "instructions": []
        }))
        .map(|mut recipe: Recipe| {
            recipe.instructions = vec![
                step(1, "Sear the chicken.", &["sear"]),
                step(2, "Simmer the sauce.", &["simmer"]),
                step(3, "Plate and garnish.", &["plate"]),
            ];
            recipe
        })
        .unwrap()
    }

    fn pipeline_with_mock(
        mock: MockCaptionSource,
        cache_dir: &std::path::Path,
    ) -> AlignmentPipeline {
        let mut sources = SourceRegistry::empty();
        sources.register(Box::new(mock));
        let cache = Box::new(LocalCache::new(Some(cache_dir.to_path_buf())).unwrap());
        AlignmentPipeline::with_parts(Config::default(), sources, cache)
    }

    #[tokio::test]
    async fn test_extract_processes_and_caches() {
        let mut mock = MockCaptionSource::new();
        mock.expect_supports_url().return_const(true);
        // A single fetch: the second extract must come from the cache.
        mock.expect_fetch()
            .times(1)
            .returning(|_| Ok(extraction_fixture()));

        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with_mock(mock, dir.path());

        let (data, report) = pipeline.extract(URL, false).await.unwrap();
        assert!(!report.cache_hit);
        assert_eq!(report.cues_parsed, 3);
        assert_eq!(report.segment_count, 3);
        assert_eq!(data.metadata.duration, 90);
        assert!(data.transcript.is_some());

        let (_, second) = pipeline.extract(URL, false).await.unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.segment_count, 3);
    }

    #[tokio::test]
    async fn test_skip_cache_forces_fetch() {
        let mut mock = MockCaptionSource::new();
        mock.expect_supports_url().return_const(true);
        mock.expect_fetch()
            .times(2)
            .returning(|_| Ok(extraction_fixture()));

        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with_mock(mock, dir.path());

        pipeline.extract(URL, true).await.unwrap();
        let (_, report) = pipeline.extract(URL, true).await.unwrap();
        assert!(!report.cache_hit);
    }

    #[tokio::test]
    async fn test_align_fills_references_and_times() {
        let mut mock = MockCaptionSource::new();
        mock.expect_supports_url().return_const(true);
        mock.expect_fetch()
            .times(1)
            .returning(|_| Ok(extraction_fixture()));

        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with_mock(mock, dir.path());

        let (recipe, report) = pipeline
            .align(URL, Some(recipe_fixture()), false)
            .await
            .unwrap();

        assert_eq!(report.steps_timed, 3);
        assert!(report.matches_found >= 3);

        let times: Vec<_> = recipe
            .instructions
            .iter()
            .map(|inst| inst.predicted_time.expect("predicted"))
            .collect();

        assert_eq!(times[0].start_seconds, 10);
        for pair in times.windows(2) {
            assert!(pair[1].start_seconds >= pair[0].end_seconds);
        }
        assert_eq!(times[2].end_seconds, 90);
        assert_eq!(recipe.video_id, "abc123def45");
    }

    #[tokio::test]
    async fn test_align_without_captions_is_no_captions_error() {
        let mut mock = MockCaptionSource::new();
        mock.expect_supports_url().return_const(true);
        mock.expect_fetch().returning(|_| {
            Ok(VideoExtraction {
                metadata: metadata(90),
                captions: None,
            })
        });

        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with_mock(mock, dir.path());

        let err = pipeline
            .align(URL, Some(recipe_fixture()), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No English captions"));
    }

    #[test]
    fn test_cues_from_segments_roundtrip() {
        let segments = vec![Segment {
            start_time: 1.5,
            end_time: 3.25,
            text: "hello there".to_string(),
        }];
        let cues = cues_from_segments(&segments);
        assert_eq!(cues[0].start_ms, 1_500);
        assert_eq!(cues[0].end_ms, 3_250);
        assert_eq!(cues[0].text, "hello there");
    }
}
