//! Transcript assembly from deduplicated cues.
//!
//! Joins cue texts into plain prose, inserting paragraph breaks at long
//! silences, and emits the parallel timed segment list used for timeline
//! rendering. Assumes the cues are already deduplicated.

use serde::{Deserialize, Serialize};

use crate::captions::{Cue, Segment};

/// Assembled transcript: plain text plus the parallel timed segment list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(rename = "plainText")]
    pub plain_text: String,

    pub segments: Vec<Segment>,
}

/// Gap at or above which a paragraph break is inserted (seconds).
const PARAGRAPH_GAP_SECONDS: f64 = 2.0;

/// Gap at or above which a line break is inserted (seconds).
const LINE_GAP_SECONDS: f64 = 1.0;

/// Join deduplicated cues into a transcript and a segment per cue.
pub fn assemble(cues: &[Cue]) -> Transcript {
    let mut plain = String::new();
    let mut segments = Vec::with_capacity(cues.len());

    for (i, cue) in cues.iter().enumerate() {
        let text = cue.flat_text();

        segments.push(Segment {
            start_time: cue.start_seconds(),
            end_time: cue.end_seconds(),
            text: text.clone(),
        });

        if i > 0 {
            let gap = cue.start_seconds() - cues[i - 1].end_seconds();
            if gap >= PARAGRAPH_GAP_SECONDS {
                plain.push_str("\n\n");
            } else if gap >= LINE_GAP_SECONDS {
                plain.push('\n');
            } else {
                plain.push(' ');
            }
        }

        plain.push_str(&text);
    }

    Transcript {
        plain_text: collapse_spaces(&plain),
        segments,
    }
}

/// Collapse runs of spaces to a single space, leaving newlines untouched.
fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_was_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !prev_was_space {
                out.push(c);
            }
            prev_was_space = true;
        } else {
            out.push(c);
            prev_was_space = false;
        }
    }
    out
}
