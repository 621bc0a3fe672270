//! Keyword search over deduplicated cues.
//!
//! Matches stemmed keywords (exactly or fuzzily) against normalized cue text,
//! collapses repeated hits of the same keyword inside a 3-second window, and
//! extracts a short context excerpt around each retained hit.

use std::collections::HashMap;

use crate::align::text::{is_stopword, normalize_text, stem_keyword, TextAnalyzer};
use crate::captions::Cue;
use crate::recipe::KeywordMatch;

/// Minimum fuzzy similarity (0-100) for a keyword to count as present.
pub const DEFAULT_FUZZY_THRESHOLD: u8 = 80;

/// Radius within which repeated hits of one keyword collapse to one match.
const DEDUP_WINDOW_SECONDS: i64 = 3;

/// Context excerpts longer than this are trimmed around the keyword.
const CONTEXT_MAX_CHARS: usize = 100;

/// Characters kept on each side of the keyword when trimming context.
const CONTEXT_RADIUS_CHARS: usize = 40;

/// Searches cue text for recipe keywords.
pub struct KeywordMatcher<'a> {
    analyzer: &'a dyn TextAnalyzer,
    fuzzy_threshold: u8,
}

impl<'a> KeywordMatcher<'a> {
    pub fn new(analyzer: &'a dyn TextAnalyzer) -> Self {
        Self {
            analyzer,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    pub fn with_threshold(analyzer: &'a dyn TextAnalyzer, fuzzy_threshold: u8) -> Self {
        Self {
            analyzer,
            fuzzy_threshold,
        }
    }

    /// Search every cue for every keyword, returning retained matches sorted
    /// ascending by timestamp.
    pub fn search(&self, cues: &[Cue], keywords: &[String]) -> Vec<KeywordMatch> {
        let display: Vec<String> = cues.iter().map(Cue::flat_text).collect();
        let normalized: Vec<String> = display
            .iter()
            .map(|text| normalize_text(self.analyzer, text))
            .collect();

        let mut matches = Vec::new();
        // Prior match timestamps per keyword (case-insensitive, unstemmed),
        // for temporal deduplication.
        let mut seen_timestamps: HashMap<String, Vec<i64>> = HashMap::new();

        for keyword in keywords {
            if is_stopword(keyword) {
                continue;
            }

            let stemmed = stem_keyword(self.analyzer, keyword);
            if stemmed.is_empty() {
                continue;
            }

            let seen = seen_timestamps
                .entry(keyword.to_lowercase())
                .or_default();

            for (i, cue_norm) in normalized.iter().enumerate() {
                if !self.keyword_in_cue(&stemmed, cue_norm) {
                    continue;
                }

                let timestamp = cues[i].start_seconds() as i64;
                if seen
                    .iter()
                    .any(|&prior| (timestamp - prior).abs() <= DEDUP_WINDOW_SECONDS)
                {
                    continue;
                }
                seen.push(timestamp);

                matches.push(KeywordMatch {
                    keyword: keyword.clone(),
                    timestamp_seconds: timestamp.max(0) as u64,
                    context: build_context(&display, i, keyword),
                });
            }
        }

        matches.sort_by_key(|m| m.timestamp_seconds);
        matches
    }

    fn keyword_in_cue(&self, stemmed_keyword: &str, cue_norm: &str) -> bool {
        if stemmed_keyword.contains(' ') {
            // Multi-word keyword: full phrase as a substring, or a partial
            // fuzzy match against the cue text.
            cue_norm.contains(stemmed_keyword)
                || self.partial_similarity(stemmed_keyword, cue_norm) >= self.fuzzy_threshold
        } else {
            cue_norm.split_whitespace().any(|word| {
                word == stemmed_keyword
                    || self.analyzer.similarity(word, stemmed_keyword) >= self.fuzzy_threshold
            })
        }
    }

    /// Best similarity between the phrase and any window of the cue's tokens
    /// of the same length as the phrase.
    fn partial_similarity(&self, phrase: &str, cue_norm: &str) -> u8 {
        let tokens: Vec<&str> = cue_norm.split_whitespace().collect();
        let width = phrase.split_whitespace().count();

        if tokens.len() <= width {
            return self.analyzer.similarity(phrase, cue_norm);
        }

        tokens
            .windows(width)
            .map(|window| self.analyzer.similarity(phrase, &window.join(" ")))
            .max()
            .unwrap_or(0)
    }
}

/// Concatenate the previous, matching, and next cue texts, trimming around
/// the keyword when the excerpt runs long.
fn build_context(display: &[String], index: usize, keyword: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if index > 0 {
        parts.push(&display[index - 1]);
    }
    parts.push(&display[index]);
    if index + 1 < display.len() {
        parts.push(&display[index + 1]);
    }
    let context = parts.join(" ");

    let chars: Vec<char> = context.chars().collect();
    if chars.len() <= CONTEXT_MAX_CHARS {
        return context;
    }

    match find_case_insensitive(&chars, keyword) {
        None => {
            // Keyword not literally present (stem or fuzzy hit); take the head.
            let head: String = chars[..CONTEXT_MAX_CHARS].iter().collect();
            format!("{}...", head)
        }
        Some(at) => {
            let keyword_len = keyword.chars().count();
            let start = at.saturating_sub(CONTEXT_RADIUS_CHARS);
            let end = (at + keyword_len + CONTEXT_RADIUS_CHARS).min(chars.len());

            let mut excerpt = String::new();
            if start > 0 {
                excerpt.push_str("...");
            }
            excerpt.extend(&chars[start..end]);
            if end < chars.len() {
                excerpt.push_str("...");
            }
            excerpt
        }
    }
}

/// Case-insensitive substring search, by character index.
fn find_case_insensitive(haystack: &[char], needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.to_lowercase().chars().collect();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    (0..=haystack.len() - needle.len()).find(|&i| {
        haystack[i..i + needle.len()]
            .iter()
            .zip(needle.iter())
            .all(|(h, n)| h.to_lowercase().eq(std::iter::once(*n)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::text::SnowballAnalyzer;

    fn cue(start_ms: u64, text: &str) -> Cue {
        Cue::new(start_ms, start_ms + 2_000, text)
    }

    fn search(cues: &[Cue], keywords: &[&str]) -> Vec<KeywordMatch> {
        let analyzer = SnowballAnalyzer::new();
        let matcher = KeywordMatcher::new(&analyzer);
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_string()).collect();
        matcher.search(cues, &keywords)
    }

    #[test]
    fn test_exact_stem_match() {
        let cues = vec![cue(5_000, "now we chop the carrots")];
        let matches = search(&cues, &["chopped"]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].keyword, "chopped");
        assert_eq!(matches[0].timestamp_seconds, 5);
    }

    #[test]
    fn test_fuzzy_single_word_match() {
        // Misspelled transcript word still scores >= 80 against the keyword.
        let cues = vec![cue(10_000, "wisk the eggs until fluffy")];
        let matches = search(&cues, &["whisk"]);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_unrelated_word_no_match() {
        let cues = vec![cue(0, "preheat the oven")];
        assert!(search(&cues, &["paprika"]).is_empty());
    }

    #[test]
    fn test_multi_word_phrase_match() {
        let cues = vec![cue(8_000, "drizzle the olive oil over everything")];
        let matches = search(&cues, &["olive oil"]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].timestamp_seconds, 8);
    }

    #[test]
    fn test_multi_word_partial_fuzzy_match() {
        let cues = vec![cue(3_000, "pour in the chiken stock and stir")];
        let matches = search(&cues, &["chicken stock"]);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_stopword_never_matches() {
        let cues = vec![cue(0, "add the flour then add the sugar")];
        assert!(search(&cues, &["add"]).is_empty());
    }

    #[test]
    fn test_temporal_dedup_within_window() {
        // Hits at 10s and 11s collapse to one retained match.
        let cues = vec![
            cue(10_000, "sear the steak on one side"),
            cue(11_000, "keep searing until browned"),
        ];
        let matches = search(&cues, &["sear"]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].timestamp_seconds, 10);
    }

    #[test]
    fn test_temporal_dedup_outside_window() {
        // Hits at 10s and 14s both survive.
        let cues = vec![
            cue(10_000, "sear the steak on one side"),
            cue(14_000, "sear the other side too"),
        ];
        let matches = search(&cues, &["sear"]);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_dedup_groups_keywords_case_insensitively() {
        let cues = vec![
            cue(10_000, "tear the basil leaves"),
            cue(11_000, "basil goes in last"),
        ];
        let matches = search(&cues, &["Basil", "basil"]);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_short_context_includes_neighbours() {
        let cues = vec![
            cue(0, "first the marinade"),
            cue(2_000, "sear the lamb"),
            cue(4_000, "then rest it"),
        ];
        let matches = search(&cues, &["lamb"]);
        assert_eq!(
            matches[0].context,
            "first the marinade sear the lamb then rest it"
        );
    }

    #[test]
    fn test_long_context_trimmed_around_keyword() {
        let long = "this sentence keeps going on and on about nothing in particular for quite a while longer";
        let cues = vec![
            cue(0, long),
            cue(2_000, "finally we julienne the peppers"),
            cue(4_000, long),
        ];
        let matches = search(&cues, &["julienne"]);
        let context = &matches[0].context;
        assert!(context.len() < long.len() * 2);
        assert!(context.contains("julienne"));
        assert!(context.starts_with("..."));
        assert!(context.ends_with("..."));
    }

    #[test]
    fn test_matches_sorted_by_timestamp() {
        let cues = vec![
            cue(20_000, "grate the parmesan"),
            cue(5_000, "boil the spaghetti"),
        ];
        let matches = search(&cues, &["parmesan", "spaghetti"]);
        assert_eq!(matches.len(), 2);
        assert!(matches[0].timestamp_seconds <= matches[1].timestamp_seconds);
    }
}
