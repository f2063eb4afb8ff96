//! bedrock-bench: invoke Amazon Bedrock models and account for their usage.
//!
//! The library is split into:
//! - [`llm`]: the inference gateway, model catalog and transports
//! - [`usage`]: token estimation, pricing and cost accounting
//! - [`bench`]: multi-prompt, multi-model comparisons and cost tables
//! - [`report`]: plain-text rendering of benchmark results

pub mod bench;
pub mod config;
pub mod llm;
pub mod logging;
pub mod report;
pub mod usage;

pub use config::Config;
pub use llm::{
    Backend, CatalogError, GatewayError, InferenceGateway, InvocationRequest, InvocationResult, ModelCatalog,
};
pub use usage::{PricingEntry, PricingTable, UsageAccountant, UsageStats};
