//! Cue-format parser.
//!
//! Accepts the WebVTT-style shape YouTube serves for captions: blocks of a
//! `HH:MM:SS.mmm --> HH:MM:SS.mmm` timestamp line followed by one or more text
//! lines, separated by blank lines or by the next timestamp line. Inline
//! word-timing tags (`<00:00:00.480><c>word</c>`) are stripped from the text.

use crate::captions::Cue;
use crate::{Result, StepscribeError};

/// Parse raw caption content into a lazy cue iterator.
///
/// The iterator borrows `content`, so parsing can be restarted by calling
/// `parse` again. Fails with `UnsupportedFormat` when the content contains no
/// valid timestamp line at all; blocks with a timestamp but no text are
/// skipped silently.
pub fn parse(content: &str) -> Result<CueIter<'_>> {
    if !content
        .lines()
        .any(|line| parse_timestamp_line(line.trim()).is_some())
    {
        return Err(StepscribeError::UnsupportedFormat(
            "no cue timestamp lines found".to_string(),
        )
        .into());
    }

    Ok(CueIter {
        lines: content.lines().peekable(),
    })
}

/// Lazy iterator over the cues in a caption document.
#[derive(Debug)]
pub struct CueIter<'a> {
    lines: std::iter::Peekable<std::str::Lines<'a>>,
}

impl Iterator for CueIter<'_> {
    type Item = Cue;

    fn next(&mut self) -> Option<Cue> {
        while let Some(line) = self.lines.next() {
            let Some((start_ms, end_ms)) = parse_timestamp_line(line.trim()) else {
                continue;
            };

            let mut text_lines: Vec<String> = Vec::new();
            while let Some(next) = self.lines.peek() {
                let trimmed = next.trim();
                if trimmed.is_empty() || parse_timestamp_line(trimmed).is_some() {
                    break;
                }
                let cleaned = clean_text_line(trimmed);
                if !cleaned.is_empty() {
                    text_lines.push(cleaned);
                }
                self.lines.next();
            }

            // A timestamp block with no text contributes nothing.
            if text_lines.is_empty() {
                continue;
            }

            return Some(Cue {
                start_ms,
                end_ms,
                text: text_lines.join("\n"),
            });
        }

        None
    }
}

/// Parse a `HH:MM:SS.mmm --> HH:MM:SS.mmm` line, tolerating trailing cue
/// settings such as `align:start position:0%`.
fn parse_timestamp_line(line: &str) -> Option<(u64, u64)> {
    let (left, right) = line.split_once("-->")?;
    let start = parse_timestamp(left.trim())?;
    let end = parse_timestamp(right.trim().split_whitespace().next()?)?;
    Some((start, end))
}

/// Parse a single `HH:MM:SS.mmm` timestamp into milliseconds.
fn parse_timestamp(ts: &str) -> Option<u64> {
    let mut parts = ts.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (seconds, millis) = seconds_part.split_once('.')?;
    let seconds: u64 = seconds.parse().ok()?;
    if millis.len() != 3 {
        return None;
    }
    let millis: u64 = millis.parse().ok()?;

    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    Some(((hours * 60 + minutes) * 60 + seconds) * 1000 + millis)
}

/// Strip angle-bracket tags and collapse internal whitespace to single spaces.
fn clean_text_line(line: &str) -> String {
    let mut stripped = String::with_capacity(line.len());
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
