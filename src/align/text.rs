//! Text normalization and the pluggable stemming/similarity capability.

use rust_stemmers::{Algorithm, Stemmer};

/// Keywords too generic to be useful as search terms; always excluded from
/// matching regardless of case.
pub const STOPWORDS: &[&str] = &[
    // Generic verbs that match too broadly
    "form", "place", "put", "add", "make", "take", "get", "use", "set", "turn", "let", "give",
    "keep", "bring", "start", "try", "want",
    // Common cooking terms that are too vague without context
    "top", "side", "bit", "way", "time", "thing", "part", "end",
];

pub fn is_stopword(keyword: &str) -> bool {
    STOPWORDS.contains(&keyword.to_lowercase().as_str())
}

/// Narrow capability interface for the keyword matcher: stemming a single
/// token and scoring string similarity on a 0-100 scale. Any Porter-family
/// stemmer and edit-distance ratio can be substituted without touching the
/// matcher's control flow.
pub trait TextAnalyzer: Send + Sync {
    /// Reduce a token to its stem ("chopped" -> "chop").
    fn stem(&self, token: &str) -> String;

    /// Similarity ratio between two strings, 0 (unrelated) to 100 (equal).
    fn similarity(&self, a: &str, b: &str) -> u8;
}

/// Default analyzer: Snowball English stemming with a normalized
/// Levenshtein ratio.
pub struct SnowballAnalyzer {
    stemmer: Stemmer,
}

impl SnowballAnalyzer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for SnowballAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextAnalyzer for SnowballAnalyzer {
    fn stem(&self, token: &str) -> String {
        self.stemmer.stem(token).into_owned()
    }

    fn similarity(&self, a: &str, b: &str) -> u8 {
        (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
    }
}

/// Normalize free text for matching: lowercase, strip punctuation, stem each
/// token, rejoin with single spaces.
pub fn normalize_text(analyzer: &dyn TextAnalyzer, text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .map(|word| analyzer.stem(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stem a keyword (possibly multi-word) for matching.
pub fn stem_keyword(analyzer: &dyn TextAnalyzer, keyword: &str) -> String {
    keyword
        .to_lowercase()
        .split_whitespace()
        .map(|word| analyzer.stem(word))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwords_case_insensitive() {
        assert!(is_stopword("add"));
        assert!(is_stopword("Add"));
        assert!(is_stopword("PLACE"));
        assert!(!is_stopword("sear"));
    }

    #[test]
    fn test_stemming() {
        let analyzer = SnowballAnalyzer::new();
        assert_eq!(analyzer.stem("chopped"), "chop");
        assert_eq!(analyzer.stem("onions"), "onion");
        assert_eq!(analyzer.stem("simmering"), "simmer");
    }

    #[test]
    fn test_similarity_scale() {
        let analyzer = SnowballAnalyzer::new();
        assert_eq!(analyzer.similarity("whisk", "whisk"), 100);
        assert!(analyzer.similarity("whisk", "wisk") >= 80);
        assert!(analyzer.similarity("whisk", "oven") < 50);
    }

    #[test]
    fn test_normalize_text() {
        let analyzer = SnowballAnalyzer::new();
        assert_eq!(
            normalize_text(&analyzer, "Chopped the onions, finely!"),
            "chop the onion fine"
        );
    }

    #[test]
    fn test_stem_keyword_multi_word() {
        let analyzer = SnowballAnalyzer::new();
        assert_eq!(stem_keyword(&analyzer, "chopped onions"), "chop onion");
    }
}
