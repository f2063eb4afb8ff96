//! Usage accounting: token estimation, pricing and cost.

pub mod accountant;
pub mod pricing;
pub mod tokens;

pub use accountant::{UsageAccountant, UsageStats};
pub use pricing::{PricingEntry, PricingSource, PricingTable};
pub use tokens::{word_count, TokenEstimator, WordCountEstimator};
