//! Per-model pricing table.
//!
//! Rates are USD per 1K tokens. Lookups never fail: a model missing from the
//! table is priced with the fallback entry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Input rate applied to models missing from the table.
pub const FALLBACK_INPUT_RATE: f64 = 0.00001;
/// Output rate applied to models missing from the table.
pub const FALLBACK_OUTPUT_RATE: f64 = 0.00003;

/// Bedrock on-demand rates (USD per 1K tokens) for the Claude models this tool benchmarks.
const BUILTIN_RATES: &[(&str, f64, f64)] = &[
    ("anthropic.claude-3-5-sonnet-20240620-v1:0", 0.003, 0.015),
    ("anthropic.claude-3-5-sonnet-20241022-v2:0", 0.003, 0.015),
    ("anthropic.claude-3-5-haiku-20241022-v1:0", 0.0008, 0.004),
    ("anthropic.claude-3-haiku-20240307-v1:0", 0.00025, 0.00125),
    ("anthropic.claude-3-sonnet-20240229-v1:0", 0.003, 0.015),
    ("anthropic.claude-3-opus-20240229-v1:0", 0.015, 0.075),
];

/// Cost rates for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub model_id: String,
    /// Cost per 1K input tokens
    pub input_rate: f64,
    /// Cost per 1K output tokens
    pub output_rate: f64,
}

impl PricingEntry {
    pub fn new(model_id: impl Into<String>, input_rate: f64, output_rate: f64) -> Self {
        Self {
            model_id: model_id.into(),
            input_rate,
            output_rate,
        }
    }

    /// `(tokens_in * input_rate + tokens_out * output_rate) / 1000`
    pub fn cost(&self, tokens_in: u64, tokens_out: u64) -> f64 {
        (tokens_in as f64 * self.input_rate + tokens_out as f64 * self.output_rate) / 1000.0
    }
}

/// Where a resolved price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingSource {
    /// The model has its own entry
    Listed,
    /// Unknown model, priced with the fallback entry
    Fallback,
}

/// Lookup structure from model id to rates, with a defined default.
#[derive(Debug, Clone)]
pub struct PricingTable {
    entries: HashMap<String, PricingEntry>,
    fallback: PricingEntry,
}

impl PricingTable {
    /// Empty table that prices everything with `fallback`.
    pub fn with_fallback(fallback: PricingEntry) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    /// Table holding the built-in Bedrock rates.
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for (model_id, input, output) in BUILTIN_RATES {
            table.insert(PricingEntry::new(*model_id, *input, *output));
        }
        table
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, entry: PricingEntry) {
        self.entries.insert(entry.model_id.clone(), entry);
    }

    /// Resolve the entry for `model_id`, falling back to the default entry.
    pub fn resolve(&self, model_id: &str) -> (&PricingEntry, PricingSource) {
        match self.entries.get(model_id) {
            Some(entry) => (entry, PricingSource::Listed),
            None => (&self.fallback, PricingSource::Fallback),
        }
    }

    pub fn fallback(&self) -> &PricingEntry {
        &self.fallback
    }

    /// Listed entries sorted by model id.
    pub fn entries(&self) -> Vec<&PricingEntry> {
        let mut entries: Vec<&PricingEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.model_id.cmp(&b.model_id));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::with_fallback(PricingEntry::new("default", FALLBACK_INPUT_RATE, FALLBACK_OUTPUT_RATE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_uses_fallback() {
        let table = PricingTable::builtin();
        let (entry, source) = table.resolve("meta.llama3-8b-instruct-v1:0");
        assert_eq!(source, PricingSource::Fallback);
        assert_eq!(entry.input_rate, FALLBACK_INPUT_RATE);
        assert_eq!(entry.output_rate, FALLBACK_OUTPUT_RATE);
    }

    #[test]
    fn test_listed_model_resolves() {
        let table = PricingTable::builtin();
        let (entry, source) = table.resolve("anthropic.claude-3-haiku-20240307-v1:0");
        assert_eq!(source, PricingSource::Listed);
        assert_eq!(entry.input_rate, 0.00025);
        assert_eq!(entry.output_rate, 0.00125);
    }

    #[test]
    fn test_no_substring_matching() {
        let table = PricingTable::builtin();
        // Prefix of a listed id is still unknown
        let (_, source) = table.resolve("anthropic.claude-3-haiku");
        assert_eq!(source, PricingSource::Fallback);
    }

    #[test]
    fn test_insert_overrides_builtin() {
        let mut table = PricingTable::builtin();
        let before = table.len();
        table.insert(PricingEntry::new("anthropic.claude-3-haiku-20240307-v1:0", 1.0, 2.0));
        assert_eq!(table.len(), before);
        let (entry, _) = table.resolve("anthropic.claude-3-haiku-20240307-v1:0");
        assert_eq!(entry.input_rate, 1.0);
    }

    #[test]
    fn test_cost_formula() {
        let entry = PricingEntry::new("m", 0.003, 0.015);
        let cost = entry.cost(1000, 2000);
        assert!((cost - (0.003 + 0.030)).abs() < 1e-12);
        assert_eq!(entry.cost(0, 0), 0.0);
    }

    #[test]
    fn test_entries_sorted() {
        let table = PricingTable::builtin();
        let ids: Vec<&str> = table.entries().iter().map(|e| e.model_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(!table.is_empty());
    }
}
