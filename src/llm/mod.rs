//! LLM layer: talking to Bedrock.
//!
//! This module handles every interaction with hosted models:
//! - Transport abstraction (AWS SDK or API-key HTTP client)
//! - The inference gateway (one prompt in, one completion out)
//! - The foundation model catalog

pub mod bedrock_http;
pub mod bedrock_sdk;
pub mod catalog;
pub mod gateway;
pub mod provider;
pub mod types;

use std::sync::Arc;

use crate::config::Config;

// Re-export key types
pub use catalog::{CatalogError, ModelCatalog};
pub use gateway::{GatewayError, InferenceGateway};
pub use provider::{ModelCatalogApi, ModelRuntime, TransportError};
pub use types::{InvocationRequest, InvocationResult, ModelDetails, ModelSummary};

/// Runtime and catalog views of one connected transport.
#[derive(Clone)]
pub struct Backend {
    pub runtime: Arc<dyn ModelRuntime>,
    pub catalog: Arc<dyn ModelCatalogApi>,
}

impl Backend {
    fn from_transport<T: ModelRuntime + ModelCatalogApi + 'static>(transport: T) -> Self {
        let transport = Arc::new(transport);
        Self {
            runtime: transport.clone(),
            catalog: transport,
        }
    }

    /// Connect using an API key when one is configured, else the AWS SDK.
    pub async fn connect(config: &Config) -> Result<Self, TransportError> {
        match &config.api_key {
            Some(key) => {
                tracing::debug!(region = %config.region, "using Bedrock API key transport");
                Ok(Self::from_transport(bedrock_http::HttpTransport::new(&config.region, key.clone())?))
            }
            None => {
                tracing::debug!(
                    region = %config.region,
                    profile = config.profile.as_deref().unwrap_or("default"),
                    "using AWS SDK transport"
                );
                Ok(Self::from_transport(
                    bedrock_sdk::SdkTransport::connect(config.profile.as_deref(), &config.region).await,
                ))
            }
        }
    }

    pub fn gateway(&self, default_model: impl Into<String>) -> InferenceGateway {
        InferenceGateway::new(self.runtime.clone(), default_model)
    }

    pub fn model_catalog(&self) -> ModelCatalog {
        ModelCatalog::new(self.catalog.clone())
    }
}
