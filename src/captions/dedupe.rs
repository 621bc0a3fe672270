//! Deduplication of overlapping auto-generated captions.
//!
//! YouTube's auto captions repeat a rolling window of words across consecutive
//! cues ("the quick" then "the quick brown fox"). This pass removes the
//! duplication while preserving timing: a forward scan that carries a single
//! pending cue and builds a fresh output list, so the input sequence is never
//! mutated in place.

use crate::captions::Cue;

/// Window below which a contained cue is treated as a pure duplicate (ms).
const PURE_DUPLICATE_MS: u64 = 150;

/// Gap below which a growing-window cue absorbs its predecessor (ms).
const GROWING_WINDOW_GAP_MS: i64 = 150;

/// Collapse duplicated and overlapping cues into a clean, ordered sequence.
///
/// Running this over an already-clean sequence is a no-op.
pub fn dedupe_cues(cues: impl IntoIterator<Item = Cue>) -> Vec<Cue> {
    let mut out = Vec::new();
    let mut pending: Option<Cue> = None;

    for mut cue in cues {
        let Some(mut prev) = pending.take() else {
            pending = Some(cue);
            continue;
        };

        cue.text = cue.text.trim().to_string();
        if cue.text.is_empty() {
            pending = Some(prev);
            continue;
        }

        // A near-zero-duration cue whose text the pending cue already carries
        // is a pure duplicate: keep the pending text, take the later end time.
        if cue.duration_ms() < PURE_DUPLICATE_MS && prev.text.contains(&cue.text) {
            prev.end_ms = cue.end_ms;
            pending = Some(prev);
            continue;
        }

        // Growing window: a single-line cue that restates the whole pending
        // cue and extends it ("the quick" -> "the quick brown fox") supersedes
        // the pending cue, inheriting its start time.
        if !prev.text.contains('\n')
            && !cue.text.contains('\n')
            && cue.text.contains(&prev.text)
            && (cue.start_ms as i64 - prev.end_ms as i64) < GROWING_WINDOW_GAP_MS
        {
            cue.start_ms = prev.start_ms;
            pending = Some(cue);
            continue;
        }

        let current_lines: Vec<&str> = cue.text.split('\n').collect();
        let last_lines: Vec<&str> = prev.text.split('\n').collect();

        let mut single_word_merge = false;

        if current_lines.first() == last_lines.last() {
            if last_lines.len() == 1
                && !last_lines[0].contains(' ')
                && last_lines[0].chars().count() > 2
            {
                // Carried single word: reattach it to the front of the new
                // cue's remaining text and suppress the pending cue.
                single_word_merge = true;
                let rest = current_lines[1..].join("\n");
                cue.text = if rest.is_empty() {
                    current_lines[0].to_string()
                } else {
                    format!("{} {}", current_lines[0], rest)
                };
            } else {
                // Drop the duplicated leading line.
                cue.text = current_lines[1..].join("\n");
            }
        } else if cue.text.split_whitespace().count() <= 2 {
            // A trailing fragment of two words or fewer belongs to the
            // pending cue.
            prev.end_ms = cue.end_ms;
            prev.text.push(' ');
            prev.text.push_str(&cue.text);
            pending = Some(prev);
            continue;
        }

        // Boundary correction: pull the pending end back so neighbours never
        // overlap, and repair inverted intervals from upstream data defects.
        if cue.start_ms <= prev.end_ms {
            // Floor at 0, and never pull the end before the cue's own start.
            prev.end_ms = cue.start_ms.saturating_sub(1).max(prev.start_ms);
        }
        if cue.start_ms >= cue.end_ms {
            std::mem::swap(&mut cue.start_ms, &mut cue.end_ms);
        }

        if !single_word_merge {
            out.push(prev);
        }
        pending = Some(cue);
    }

    if let Some(prev) = pending {
        out.push(prev);
    }

    out
}
