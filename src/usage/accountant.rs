//! Usage accounting: token counts and estimated cost for one invocation.

use serde::{Deserialize, Serialize};

use super::pricing::{PricingSource, PricingTable};
use super::tokens::{TokenEstimator, WordCountEstimator};

/// Derived usage figures for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub tokens_in: u64,
    pub tokens_out: u64,
    /// `tokens_in + tokens_out`
    pub context_window: u64,
    /// Estimated cost in USD
    pub api_cost: f64,
    pub pricing_source: PricingSource,
}

/// Computes [`UsageStats`] from prompt and completion text.
///
/// Holds no mutable state: the same inputs always give the same stats.
pub struct UsageAccountant<E = WordCountEstimator> {
    pricing: PricingTable,
    estimator: E,
}

impl UsageAccountant<WordCountEstimator> {
    /// Accountant using the word-count estimator.
    pub fn new(pricing: PricingTable) -> Self {
        Self::with_estimator(pricing, WordCountEstimator)
    }
}

impl<E: TokenEstimator> UsageAccountant<E> {
    pub fn with_estimator(pricing: PricingTable, estimator: E) -> Self {
        Self { pricing, estimator }
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Estimate tokens and cost for `prompt` → `generated_text` on `model_id`.
    pub fn account(&self, prompt: &str, generated_text: &str, model_id: &str) -> UsageStats {
        let tokens_in = self.estimator.estimate(prompt);
        let tokens_out = self.estimator.estimate(generated_text);
        let (entry, pricing_source) = self.pricing.resolve(model_id);

        UsageStats {
            tokens_in,
            tokens_out,
            context_window: tokens_in + tokens_out,
            api_cost: entry.cost(tokens_in, tokens_out),
            pricing_source,
        }
    }
}

impl Default for UsageAccountant<WordCountEstimator> {
    fn default() -> Self {
        Self::new(PricingTable::builtin())
    }
}
