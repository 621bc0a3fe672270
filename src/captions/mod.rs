//! Caption processing: parsing raw cue text, collapsing the overlapping
//! duplicates that auto-generated captions produce, and assembling the
//! cleaned cues into a transcript.

use serde::{Deserialize, Serialize};

pub mod dedupe;
pub mod parser;
pub mod transcript;

pub use transcript::Transcript;

/// One timestamped caption unit as emitted by the source format, prior to cleanup.
///
/// Timestamps are millisecond offsets from the start of the video. Cues are
/// ordered by `start_ms` as they appear in the source; the text may span
/// multiple lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl Cue {
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Start offset in seconds.
    pub fn start_seconds(&self) -> f64 {
        self.start_ms as f64 / 1000.0
    }

    /// End offset in seconds.
    pub fn end_seconds(&self) -> f64 {
        self.end_ms as f64 / 1000.0
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Cue text with line breaks flattened to spaces.
    pub fn flat_text(&self) -> String {
        self.text.replace('\n', " ").trim().to_string()
    }
}

/// A cleaned, timed transcript unit produced one-to-one from deduplicated cues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Segment text
    pub text: String,
}

/// Result of running the full caption pipeline over raw cue text.
#[derive(Debug, Clone)]
pub struct ProcessedCaptions {
    /// Assembled transcript (plain text plus timed segments)
    pub transcript: Transcript,

    /// Deduplicated cues, consumed downstream by the keyword matcher
    pub cues: Vec<Cue>,

    /// Number of raw cues before deduplication
    pub cues_parsed: usize,
}

/// Run parse, dedupe, and assembly over raw caption content.
///
/// Fails only when the content contains no recognizable timestamp line; every
/// other anomaly (empty blocks, overlapping cues) degrades per the dedupe and
/// assembly rules.
pub fn process(content: &str) -> crate::Result<ProcessedCaptions> {
    let raw: Vec<Cue> = parser::parse(content)?.collect();
    let cues_parsed = raw.len();

    let cues = dedupe::dedupe_cues(raw);
    let transcript = transcript::assemble(&cues);

    tracing::debug!(
        cues_parsed,
        cues_emitted = cues.len(),
        "processed caption content"
    );

    Ok(ProcessedCaptions {
        transcript,
        cues,
        cues_parsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "WEBVTT\n\
        \n\
        00:00:00.000 --> 00:00:02.500\n\
        first we chop the onions\n\
        \n\
        00:00:03.800 --> 00:00:06.100\n\
        then sear the chicken thighs\n";

    #[test]
    fn test_process_full_pipeline() {
        let processed = process(SAMPLE).unwrap();
        assert_eq!(processed.cues_parsed, 2);
        assert_eq!(processed.cues.len(), 2);
        assert_eq!(processed.transcript.segments.len(), 2);
        assert!(processed
            .transcript
            .plain_text
            .contains("first we chop the onions"));
    }

    #[test]
    fn test_process_rejects_non_cue_content() {
        assert!(process("just some prose, no timestamps").is_err());
    }

    #[test]
    fn test_dedup_length_bound() {
        // Deduplicated cue count never exceeds the raw cue count.
        let processed = process(SAMPLE).unwrap();
        assert!(processed.cues.len() <= processed.cues_parsed);
    }

    #[test]
    fn test_cue_seconds() {
        let cue = Cue::new(1_500, 4_250, "hello");
        assert_eq!(cue.start_seconds(), 1.5);
        assert_eq!(cue.end_seconds(), 4.25);
        assert_eq!(cue.duration_ms(), 2_750);
    }
}
