//! The transport abstraction.
//!
//! These traits are the seam between the gateway/catalog and whatever
//! actually talks to Bedrock: the AWS SDK, the API-key HTTP client, or a
//! test double.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{ModelDetails, ModelSummary};

/// Failure reported by a transport.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("throttled: {0}")]
    Throttled(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service error: {0}")]
    Service(String),
    #[error("network error: {0}")]
    Network(String),
}

impl TransportError {
    /// Map a service error code (e.g. `ThrottlingException`) to an error kind.
    pub fn from_code(code: Option<&str>, message: String) -> Self {
        match code {
            Some("ThrottlingException") | Some("TooManyRequestsException") => Self::Throttled(message),
            Some("AccessDeniedException") | Some("UnrecognizedClientException") => {
                Self::AccessDenied(message)
            }
            Some("ValidationException") => Self::Validation(message),
            Some("ResourceNotFoundException") => Self::NotFound(message),
            _ => Self::Service(message),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Runtime side: send a request body to a model, get the response body back.
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// POST `body` (JSON) to `model_id`'s invoke endpoint.
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}

/// Control-plane side: foundation model metadata.
#[async_trait]
pub trait ModelCatalogApi: Send + Sync {
    async fn list_foundation_models(&self) -> Result<Vec<ModelSummary>, TransportError>;

    async fn get_foundation_model(&self, model_id: &str) -> Result<ModelDetails, TransportError>;
}
