//! Request, response and catalog types.
//!
//! The `Invoke*` structs mirror the Anthropic Messages body that Bedrock
//! accepts; field order is the serialized order.

use serde::{Deserialize, Serialize};

/// API version tag Bedrock requires for Anthropic models.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Default completion budget.
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.5;

/// The role of a message sender. Only single user turns are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A single message in the request body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Message<'a> {
    pub role: Role,
    pub content: &'a str,
}

impl<'a> Message<'a> {
    pub fn user(content: &'a str) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }
}

/// One prompt to send to a model.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub prompt: String,
    /// `None` uses the gateway's default model
    pub model_id: Option<String>,
    pub max_tokens: u32,
    /// Sampling temperature in `[0, 1]`
    pub temperature: f64,
}

impl InvocationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Outcome of one successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub model_id: String,
    /// Trimmed text of the first content block
    pub generated_text: String,
    /// Input tokens reported by the service (0 if not reported)
    pub tokens_in: u64,
    /// Output tokens reported by the service (0 if not reported)
    pub tokens_out: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

/// Body sent to the invoke endpoint.
#[derive(Debug, Serialize)]
pub struct InvokeEnvelope<'a> {
    pub anthropic_version: &'static str,
    pub max_tokens: u32,
    pub messages: Vec<Message<'a>>,
    pub temperature: f64,
}

impl<'a> InvokeEnvelope<'a> {
    /// Single user-turn envelope.
    pub fn single_turn(prompt: &'a str, max_tokens: u32, temperature: f64) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens,
            messages: vec![Message::user(prompt)],
            temperature,
        }
    }
}

/// Body returned by the invoke endpoint. Every field is optional so shape
/// problems surface as our own error instead of a serde failure.
#[derive(Debug, Deserialize)]
pub struct InvokeResponseBody {
    #[serde(default)]
    pub content: Option<Vec<ContentBlock>>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// One entry of the foundation model listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub model_id: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
}

impl ModelSummary {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(&self.model_id)
    }
}

/// Full metadata for one foundation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDetails {
    #[serde(default)]
    pub model_arn: String,
    pub model_id: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub input_modalities: Vec<String>,
    #[serde(default)]
    pub output_modalities: Vec<String>,
    #[serde(default)]
    pub response_streaming_supported: Option<bool>,
    #[serde(default)]
    pub customizations_supported: Vec<String>,
    #[serde(default)]
    pub inference_types_supported: Vec<String>,
    #[serde(default)]
    pub model_lifecycle: Option<ModelLifecycle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelLifecycle {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = InvokeEnvelope::single_turn("What's the capital of France?", 8192, 0.5);
        let body = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            body,
            r#"{"anthropic_version":"bedrock-2023-05-31","max_tokens":8192,"messages":[{"role":"user","content":"What's the capital of France?"}],"temperature":0.5}"#
        );
    }

    #[test]
    fn test_request_defaults() {
        let req = InvocationRequest::new("hi");
        assert_eq!(req.max_tokens, 8192);
        assert_eq!(req.temperature, 0.5);
        assert!(req.model_id.is_none());

        let req = req.model("m").max_tokens(10).temperature(0.0);
        assert_eq!(req.model_id.as_deref(), Some("m"));
        assert_eq!(req.max_tokens, 10);
        assert_eq!(req.temperature, 0.0);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
    }

    #[test]
    fn test_response_without_content_parses() {
        let body: InvokeResponseBody = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(body.content.is_none());
        assert!(body.usage.is_none());
    }

    #[test]
    fn test_model_summary_camel_case() {
        let summary: ModelSummary = serde_json::from_str(
            r#"{"modelId":"anthropic.claude-v2","modelName":"Claude","providerName":"Anthropic","modelArn":"arn"}"#,
        )
        .unwrap();
        assert_eq!(summary.model_id, "anthropic.claude-v2");
        assert_eq!(summary.display_name(), "Claude");
    }

    #[test]
    fn test_model_details_lifecycle() {
        let details: ModelDetails = serde_json::from_str(
            r#"{"modelId":"m","modelArn":"arn:m","inputModalities":["TEXT","IMAGE"],"modelLifecycle":{"status":"ACTIVE"}}"#,
        )
        .unwrap();
        assert_eq!(details.input_modalities, vec!["TEXT", "IMAGE"]);
        assert_eq!(details.model_lifecycle.unwrap().status, "ACTIVE");
        assert!(details.output_modalities.is_empty());
    }
}
