//! Token estimation.
//!
//! Costs are defined relative to a word-count approximation, not a real
//! tokenizer. Swapping the estimator changes every cost figure downstream.

/// Estimates how many tokens a piece of text costs.
pub trait TokenEstimator: Send + Sync {
    /// Short name shown in reports.
    fn name(&self) -> &'static str;

    /// Approximate token count of `text`.
    fn estimate(&self, text: &str) -> u64;
}

/// One token per whitespace-delimited word.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCountEstimator;

impl TokenEstimator for WordCountEstimator {
    fn name(&self) -> &'static str {
        "word-count"
    }

    fn estimate(&self, text: &str) -> u64 {
        word_count(text)
    }
}

/// Number of non-empty whitespace-separated words in `text`.
pub fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}
