//! Alignment of recipe steps to the video timeline: keyword evidence mining
//! over deduplicated cues, then per-step time window prediction.

pub mod matcher;
pub mod text;
pub mod timer;

pub use matcher::KeywordMatcher;
pub use text::{SnowballAnalyzer, TextAnalyzer};
pub use timer::{predict_step_times, MIN_STEP_DURATION_SECONDS};
