//! Step time prediction.
//!
//! Three passes over the ordered instruction list: raw start estimates from
//! keyword matches (technique keywords preferred), interpolation and
//! extrapolation for steps with no evidence, then in-order enforcement of
//! monotonicity and a minimum duration per step.

use crate::recipe::{Instruction, PredictedTime};

/// Minimum seconds a predicted step window spans, unless the video is shorter.
pub const MIN_STEP_DURATION_SECONDS: i64 = 5;

/// Predict a `{start, end}` window for every instruction.
///
/// Raw start estimates are kept in a side table and never written onto the
/// instructions; only the final `predicted_time` is stored. An empty
/// instruction list is a no-op, and a zero video duration degenerates every
/// window to `{0, 0}` - both are data-quality conditions, not errors.
pub fn predict_step_times(instructions: &mut [Instruction], video_duration: u64) {
    if instructions.is_empty() {
        return;
    }

    instructions.sort_by_key(|inst| inst.step);

    if video_duration == 0 {
        tracing::warn!("zero video duration, step windows degenerate to {{0,0}}");
        for inst in instructions.iter_mut() {
            inst.predicted_time = Some(PredictedTime {
                start_seconds: 0,
                end_seconds: 0,
            });
        }
        return;
    }

    let duration = video_duration as i64;
    let count = instructions.len();

    // First pass: raw start per step, preferring technique keyword matches.
    let mut raw_starts: Vec<Option<i64>> = instructions.iter().map(raw_start).collect();

    // Second pass: fill unknowns by interpolating between the originally
    // known neighbours, or extrapolating from the average step duration.
    let known: Vec<(usize, i64)> = raw_starts
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| raw.map(|value| (i, value)))
        .collect();

    if known.is_empty() {
        // No evidence anywhere - distribute steps evenly across the video.
        let step_duration = duration / count as i64;
        for (i, raw) in raw_starts.iter_mut().enumerate() {
            *raw = Some(i as i64 * step_duration);
        }
    } else {
        let average_duration = duration / count as i64;

        for i in 0..count {
            if raw_starts[i].is_some() {
                continue;
            }

            let prev_known = known.iter().rev().find(|(idx, _)| *idx < i);
            let next_known = known.iter().find(|(idx, _)| *idx > i);

            raw_starts[i] = Some(match (prev_known, next_known) {
                (Some(&(prev_idx, prev_time)), Some(&(next_idx, next_time))) => {
                    let ratio = (i - prev_idx) as f64 / (next_idx - prev_idx) as f64;
                    prev_time + (ratio * (next_time - prev_time) as f64) as i64
                }
                (Some(&(prev_idx, prev_time)), None) => {
                    let projected = prev_time + average_duration * (i - prev_idx) as i64;
                    projected.min(duration - MIN_STEP_DURATION_SECONDS)
                }
                (None, Some(&(next_idx, next_time))) => {
                    let projected = next_time - average_duration * (next_idx - i) as i64;
                    projected.max(0)
                }
                (None, None) => unreachable!("known starts exist"),
            });
        }
    }

    // Third pass: enforce sequential order, no overlap, minimum duration.
    let mut previous_end: i64 = 0;
    for i in 0..count {
        let raw = raw_starts[i].unwrap_or(0);

        let start = if i > 0 { raw.max(previous_end) } else { raw.max(0) };

        let mut end = if i + 1 < count {
            raw_starts[i + 1].unwrap_or(duration).max(start + MIN_STEP_DURATION_SECONDS)
        } else {
            duration
        };

        if end - start < MIN_STEP_DURATION_SECONDS {
            end = (start + MIN_STEP_DURATION_SECONDS).min(duration);
        }

        instructions[i].predicted_time = Some(PredictedTime {
            start_seconds: start.max(0) as u64,
            end_seconds: end.max(0) as u64,
        });
        previous_end = end;
    }
}

/// Raw start estimate for one step: earliest technique match if any,
/// otherwise the earliest match of any kind, otherwise unknown.
fn raw_start(instruction: &Instruction) -> Option<i64> {
    let refs = &instruction.video_references;
    if refs.is_empty() {
        return None;
    }

    let techniques: Vec<String> = instruction
        .keywords
        .techniques
        .iter()
        .map(|t| t.to_lowercase())
        .collect();

    let technique_min = refs
        .iter()
        .filter(|r| techniques.contains(&r.keyword.to_lowercase()))
        .map(|r| r.timestamp_seconds as i64)
        .min();

    technique_min.or_else(|| refs.iter().map(|r| r.timestamp_seconds as i64).min())
}
