//! Stepscribe - A Rust CLI tool for aligning recipe steps with cooking videos
//!
//! This library turns noisy, overlapping auto-generated video captions into clean
//! transcripts with timed segments, and aligns structured recipe instructions to
//! the video timeline using keyword evidence mined from the captions.

pub mod align;
pub mod cache;
pub mod captions;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod recipe;
pub mod utils;

pub use captions::{Cue, Segment, Transcript};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use fetch::{CaptionSource, VideoExtraction, VideoMetadata};
pub use pipeline::{AlignmentPipeline, ExtractionReport};
pub use recipe::{Instruction, KeywordMatch, PredictedTime, Recipe};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to stepscribe
#[derive(thiserror::Error, Debug)]
pub enum StepscribeError {
    #[error("Unsupported caption format: {0}")]
    UnsupportedFormat(String),

    #[error("No English captions available for video: {0}")]
    NoCaptions(String),

    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("Recipe extraction failed: {0}")]
    RecipeExtractionFailed(String),

    #[error("Cache operation failed: {0}")]
    CacheError(String),
}
