//! Foundation model listing and metadata (display only).

use std::sync::Arc;
use thiserror::Error;

use super::provider::{ModelCatalogApi, TransportError};
use super::types::{ModelDetails, ModelSummary};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("model not found: {0}")]
    NotFound(String),
    #[error("catalog request failed: {0}")]
    Service(#[from] TransportError),
}

pub struct ModelCatalog {
    api: Arc<dyn ModelCatalogApi>,
}

impl ModelCatalog {
    pub fn new(api: Arc<dyn ModelCatalogApi>) -> Self {
        Self { api }
    }

    /// All foundation models visible in the configured region, sorted by id.
    pub async fn list_models(&self) -> Result<Vec<ModelSummary>, CatalogError> {
        match self.api.list_foundation_models().await {
            Ok(mut models) => {
                models.sort_by(|a, b| a.model_id.cmp(&b.model_id));
                tracing::info!("Got {} foundation models", models.len());
                Ok(models)
            }
            Err(e) => {
                tracing::error!(error = %e, "couldn't list foundation models");
                Err(e.into())
            }
        }
    }

    /// Details for one model, or [`CatalogError::NotFound`].
    pub async fn get_model(&self, model_id: &str) -> Result<ModelDetails, CatalogError> {
        match self.api.get_foundation_model(model_id).await {
            Ok(details) => Ok(details),
            Err(e) if e.is_not_found() => {
                tracing::warn!(model_id, error = %e, "foundation model not found");
                Err(CatalogError::NotFound(model_id.to_string()))
            }
            Err(e) => {
                tracing::error!(model_id, error = %e, "couldn't get foundation model details");
                Err(e.into())
            }
        }
    }
}
