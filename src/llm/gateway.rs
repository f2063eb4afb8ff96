//! Inference gateway.
//!
//! Wraps exactly one outbound call per invocation: build the envelope, send
//! it, pull the generated text out of the response. Failures are logged with
//! the model id and returned; nothing is retried.

use std::sync::Arc;
use thiserror::Error;

use super::provider::{ModelRuntime, TransportError};
use super::types::{InvocationRequest, InvocationResult, InvokeEnvelope, InvokeResponseBody};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invocation of {model_id} failed: {source}")]
    ServiceError {
        model_id: String,
        #[source]
        source: TransportError,
    },
    #[error("malformed response from {model_id}: {reason}")]
    MalformedResponse { model_id: String, reason: String },
}

impl GatewayError {
    /// Model id the failed call targeted, if it got that far.
    pub fn model_id(&self) -> Option<&str> {
        match self {
            Self::InvalidRequest(_) => None,
            Self::ServiceError { model_id, .. } | Self::MalformedResponse { model_id, .. } => Some(model_id),
        }
    }
}

/// Sends prompts to hosted models through an injected [`ModelRuntime`].
#[derive(Clone)]
pub struct InferenceGateway {
    runtime: Arc<dyn ModelRuntime>,
    default_model: String,
}

impl InferenceGateway {
    pub fn new(runtime: Arc<dyn ModelRuntime>, default_model: impl Into<String>) -> Self {
        Self {
            runtime,
            default_model: default_model.into(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Invoke with default `max_tokens` and `temperature`.
    pub async fn invoke_prompt(
        &self,
        prompt: &str,
        model_id: Option<&str>,
    ) -> Result<InvocationResult, GatewayError> {
        let mut request = InvocationRequest::new(prompt);
        if let Some(id) = model_id {
            request = request.model(id);
        }
        self.invoke(&request).await
    }

    /// Send one request and return the trimmed completion.
    pub async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResult, GatewayError> {
        if let Err(e) = validate(request) {
            tracing::warn!(model_id = request.model_id.as_deref(), error = %e, "rejected invocation request");
            return Err(e);
        }

        let model_id = request.model_id.as_deref().unwrap_or(&self.default_model);
        let envelope = InvokeEnvelope::single_turn(&request.prompt, request.max_tokens, request.temperature);
        let body = serde_json::to_vec(&envelope)
            .map_err(|e| GatewayError::InvalidRequest(format!("failed to encode request: {}", e)))?;

        tracing::debug!(
            model_id,
            transport = self.runtime.name(),
            max_tokens = request.max_tokens,
            "invoking model"
        );

        let raw = match self.runtime.invoke_model(model_id, body).await {
            Ok(raw) => raw,
            Err(source) => {
                tracing::error!(model_id, error = %source, "model invocation failed");
                return Err(GatewayError::ServiceError {
                    model_id: model_id.to_string(),
                    source,
                });
            }
        };

        parse_response(model_id, &raw).map_err(|reason| {
            tracing::error!(model_id, %reason, "unexpected response shape");
            GatewayError::MalformedResponse {
                model_id: model_id.to_string(),
                reason,
            }
        })
    }
}

fn validate(request: &InvocationRequest) -> Result<(), GatewayError> {
    if request.prompt.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("prompt must not be empty".into()));
    }
    if request.max_tokens == 0 {
        return Err(GatewayError::InvalidRequest("max_tokens must be positive".into()));
    }
    if !(0.0..=1.0).contains(&request.temperature) {
        return Err(GatewayError::InvalidRequest(format!(
            "temperature {} outside [0, 1]",
            request.temperature
        )));
    }
    if matches!(request.model_id.as_deref(), Some(id) if id.trim().is_empty()) {
        return Err(GatewayError::InvalidRequest("model id must not be empty".into()));
    }
    Ok(())
}

/// Pull `content[0].text` and the reported usage out of a response body.
fn parse_response(model_id: &str, raw: &[u8]) -> Result<InvocationResult, String> {
    let body: InvokeResponseBody =
        serde_json::from_slice(raw).map_err(|e| format!("response is not valid JSON: {}", e))?;

    let content = body.content.ok_or("missing `content` field")?;
    let first = content.into_iter().next().ok_or("`content` is empty")?;
    let text = first.text.ok_or("first content block has no `text`")?;
    let usage = body.usage.unwrap_or_default();

    Ok(InvocationResult {
        model_id: model_id.to_string(),
        generated_text: text.trim().to_string(),
        tokens_in: usage.input_tokens,
        tokens_out: usage.output_tokens,
        stop_reason: body.stop_reason,
    })
}
