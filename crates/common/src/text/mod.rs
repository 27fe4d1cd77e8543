//! Sentence text representations
//!
//! The inference engine only needs two capabilities from a sentence:
//! its raw tokens (for lexicon predicates) and a similarity score against
//! another text of the same representation. Concrete representations are
//! chosen when documents are loaded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Capability interface consumed by the MRF engine
pub trait TextFeatures: Send + Sync {
    /// Original sentence text
    fn raw(&self) -> &str;

    /// Tokens in sentence order, punctuation stripped
    fn raw_words(&self) -> &[String];

    /// Similarity in [0, 1]
    fn similarity(&self, other: &Self) -> f64;
}

/// Characters removed before splitting on spaces
const STRIPPED_CHARS: &[char] = &['(', ')', '[', ']', '{', '}', ',', ':', ';', '\\', '/'];

/// Split text into words after removing brackets and punctuation.
/// Periods are only trimmed from token ends so "3.2" survives.
pub fn split_words(text: &str) -> Vec<String> {
    let cleaned: String = text.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    cleaned
        .split(' ')
        .map(|w| w.trim_matches('.'))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Numbers and single characters carry no topical signal
fn is_noise_token(word: &str) -> bool {
    word.chars().count() == 1 || word.chars().all(|c| c.is_ascii_digit())
}

/// Count lowercase n-grams, skipping any n-gram with a noise token
pub fn ngram_counts(n: usize, words: &[String]) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    if n == 0 || words.len() < n {
        return counts;
    }

    for window in words.windows(n) {
        if window.iter().any(|w| is_noise_token(w)) {
            continue;
        }
        let ngram = window.join(" ").to_lowercase();
        *counts.entry(ngram).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine similarity between two sparse vectors (0 if either is empty)
pub fn cosine_similarity(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // Iterate the smaller map
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(k, v)| large.get(k).map(|w| v * w))
        .sum();

    let norm_a: f64 = a.values().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Unigram bag-of-words with cosine similarity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BagOfWords {
    raw: String,
    words: Vec<String>,
    unigrams: HashMap<String, f64>,
}

impl BagOfWords {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let words = split_words(&raw);
        let unigrams = ngram_counts(1, &words);
        Self { raw, words, unigrams }
    }
}

impl TextFeatures for BagOfWords {
    fn raw(&self) -> &str {
        &self.raw
    }

    fn raw_words(&self) -> &[String] {
        &self.words
    }

    fn similarity(&self, other: &Self) -> f64 {
        cosine_similarity(&self.unigrams, &other.unigrams)
    }
}

impl From<String> for BagOfWords {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<BagOfWords> for String {
    fn from(text: BagOfWords) -> Self {
        text.raw
    }
}

/// Unigrams plus bigrams; similarity is the mean of both cosines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NgramText {
    raw: String,
    words: Vec<String>,
    unigrams: HashMap<String, f64>,
    bigrams: HashMap<String, f64>,
}

impl NgramText {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let words = split_words(&raw);
        let unigrams = ngram_counts(1, &words);
        let bigrams = ngram_counts(2, &words);
        Self { raw, words, unigrams, bigrams }
    }
}

impl TextFeatures for NgramText {
    fn raw(&self) -> &str {
        &self.raw
    }

    fn raw_words(&self) -> &[String] {
        &self.words
    }

    fn similarity(&self, other: &Self) -> f64 {
        let unigram = cosine_similarity(&self.unigrams, &other.unigrams);
        let bigram = cosine_similarity(&self.bigrams, &other.bigrams);
        (unigram + bigram) / 2.0
    }
}

impl From<String> for NgramText {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<NgramText> for String {
    fn from(text: NgramText) -> Self {
        text.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_strips_punctuation() {
        let words = split_words("As shown by (Collins, 2002), the  parser [3] works.");
        assert_eq!(
            words,
            vec!["As", "shown", "by", "Collins", "2002", "the", "parser", "3", "works"]
        );
    }

    #[test]
    fn test_split_keeps_interior_periods() {
        assert_eq!(split_words("3.2 Results."), vec!["3.2", "Results"]);
        assert_eq!(split_words("e.g. ...the end"), vec!["e.g", "the", "end"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_words("").is_empty());
        assert!(split_words("  ..  ").is_empty());
    }

    #[test]
    fn test_ngram_counts_skip_noise() {
        let words = split_words("the perceptron a perceptron 42");
        let unigrams = ngram_counts(1, &words);
        assert_eq!(unigrams.get("perceptron"), Some(&2.0));
        assert!(!unigrams.contains_key("a"));
        assert!(!unigrams.contains_key("42"));

        let bigrams = ngram_counts(2, &words);
        assert_eq!(bigrams.get("the perceptron"), Some(&1.0));
        assert!(!bigrams.contains_key("perceptron a"));
    }

    #[test]
    fn test_bag_of_words_similarity() {
        let a = BagOfWords::new("structured perceptron training");
        let b = BagOfWords::new("perceptron training for tagging");
        let c = BagOfWords::new("unrelated words entirely");

        let ab = a.similarity(&b);
        assert!(ab > 0.0 && ab <= 1.0);
        assert_eq!(a.similarity(&c), 0.0);
        assert!((a.similarity(&a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_similarity_is_zero() {
        let empty = NgramText::new("");
        let other = NgramText::new("some words here");
        assert_eq!(empty.similarity(&other), 0.0);
    }

    #[test]
    fn test_serde_from_plain_string() {
        let text: BagOfWords = serde_json::from_str("\"The tagger of Brill\"").unwrap();
        assert_eq!(text.raw_words().len(), 4);
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"The tagger of Brill\"");
    }
}
