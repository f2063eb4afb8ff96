//! Bedrock through the AWS SDK for Rust.
//!
//! Credentials come from the named profile (or the default chain) and every
//! request is SigV4-signed by the SDK.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrock::types::{FoundationModelDetails, FoundationModelSummary};
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::primitives::Blob;

use super::provider::{ModelCatalogApi, ModelRuntime, TransportError};
use super::types::{ModelDetails, ModelLifecycle, ModelSummary};

/// Control-plane and runtime clients sharing one SDK configuration.
pub struct SdkTransport {
    control: aws_sdk_bedrock::Client,
    runtime: aws_sdk_bedrockruntime::Client,
}

impl SdkTransport {
    /// Resolve credentials for `profile` (or the default chain) in `region`.
    pub async fn connect(profile: Option<&str>, region: &str) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        Self {
            control: aws_sdk_bedrock::Client::new(&sdk_config),
            runtime: aws_sdk_bedrockruntime::Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl ModelRuntime for SdkTransport {
    fn name(&self) -> &'static str {
        "aws-sdk"
    }

    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let output = self
            .runtime
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(classify_sdk_error)?;

        Ok(output.body.into_inner())
    }
}

#[async_trait]
impl ModelCatalogApi for SdkTransport {
    async fn list_foundation_models(&self) -> Result<Vec<ModelSummary>, TransportError> {
        let output = self
            .control
            .list_foundation_models()
            .send()
            .await
            .map_err(classify_sdk_error)?;

        Ok(output
            .model_summaries
            .unwrap_or_default()
            .into_iter()
            .map(summary_from_sdk)
            .collect())
    }

    async fn get_foundation_model(&self, model_id: &str) -> Result<ModelDetails, TransportError> {
        let output = self
            .control
            .get_foundation_model()
            .model_identifier(model_id)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        output
            .model_details
            .map(details_from_sdk)
            .ok_or_else(|| TransportError::NotFound(format!("no details returned for {}", model_id)))
    }
}

/// Service errors keep their code; anything before the service answered
/// (dispatch, timeout, credentials) is a network error.
fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> TransportError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(service) => TransportError::from_code(service.err().code(), message),
        _ => TransportError::Network(message),
    }
}

fn summary_from_sdk(summary: FoundationModelSummary) -> ModelSummary {
    ModelSummary {
        model_id: summary.model_id,
        model_name: summary.model_name,
        provider_name: summary.provider_name,
    }
}

fn details_from_sdk(details: FoundationModelDetails) -> ModelDetails {
    fn names<T: AsRef<str>>(values: Option<Vec<T>>) -> Vec<String> {
        values
            .unwrap_or_default()
            .iter()
            .map(|v| v.as_ref().to_string())
            .collect()
    }

    ModelDetails {
        model_arn: details.model_arn,
        model_id: details.model_id,
        model_name: details.model_name,
        provider_name: details.provider_name,
        input_modalities: names(details.input_modalities),
        output_modalities: names(details.output_modalities),
        response_streaming_supported: details.response_streaming_supported,
        customizations_supported: names(details.customizations_supported),
        inference_types_supported: names(details.inference_types_supported),
        model_lifecycle: details.model_lifecycle.map(|l| ModelLifecycle {
            status: l.status.as_str().to_string(),
        }),
    }
}
