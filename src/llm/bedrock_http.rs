//! Bedrock over plain HTTPS with an API key.
//!
//! Bedrock API keys are bearer tokens, so no request signing is needed and a
//! plain `reqwest` client is enough.

use super::provider::{ModelCatalogApi, ModelRuntime, TransportError};
use super::types::{ModelDetails, ModelSummary};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde::Deserialize;

/// Bedrock transport authenticated with a bearer API key.
pub struct HttpTransport {
    client: Client,
    api_key: String,
    runtime_base: Url,
    control_base: Url,
}

impl HttpTransport {
    /// Transport for the public endpoints of `region`.
    pub fn new(region: &str, api_key: String) -> Result<Self, TransportError> {
        Self::with_endpoints(
            api_key,
            &format!("https://bedrock-runtime.{}.amazonaws.com", region),
            &format!("https://bedrock.{}.amazonaws.com", region),
        )
    }

    /// Transport against explicit runtime and control-plane base URLs.
    pub fn with_endpoints(api_key: String, runtime_base: &str, control_base: &str) -> Result<Self, TransportError> {
        let parse = |s: &str| {
            Url::parse(s).map_err(|e| TransportError::Validation(format!("bad endpoint {}: {}", s, e)))
        };
        Ok(Self {
            client: Client::new(),
            api_key,
            runtime_base: parse(runtime_base)?,
            control_base: parse(control_base)?,
        })
    }

    /// `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Validation(format!("endpoint {} cannot take a path", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn invoke_url(&self, model_id: &str) -> Result<Url, TransportError> {
        Self::endpoint(&self.runtime_base, &["model", model_id, "invoke"])
    }

    fn model_url(&self, model_id: Option<&str>) -> Result<Url, TransportError> {
        match model_id {
            Some(id) => Self::endpoint(&self.control_base, &["foundation-models", id]),
            None => Self::endpoint(&self.control_base, &["foundation-models"]),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T, TransportError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::Service(format!("failed to parse Bedrock response: {}", e)))
    }
}

#[async_trait]
impl ModelRuntime for HttpTransport {
    fn name(&self) -> &'static str {
        "bedrock-api-key"
    }

    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .post(self.invoke_url(model_id)?)
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, text));
        }

        let bytes = response.bytes().await.map_err(network_error)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ModelCatalogApi for HttpTransport {
    async fn list_foundation_models(&self) -> Result<Vec<ModelSummary>, TransportError> {
        let listing: ListResponse = self.get_json(self.model_url(None)?).await?;
        Ok(listing.model_summaries)
    }

    async fn get_foundation_model(&self, model_id: &str) -> Result<ModelDetails, TransportError> {
        let detail: DetailResponse = self.get_json(self.model_url(Some(model_id))?).await?;
        Ok(detail.model_details)
    }
}

fn network_error(e: reqwest::Error) -> TransportError {
    TransportError::Network(e.to_string())
}

/// Map a non-success HTTP status to an error kind.
///
/// Bedrock puts the error message in a `message` (or `Message`) field; fall
/// back to the raw body when it isn't JSON.
pub fn classify_status(status: StatusCode, body: String) -> TransportError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or(body);
    let message = format!("status {}: {}", status, message);

    match status {
        StatusCode::TOO_MANY_REQUESTS => TransportError::Throttled(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TransportError::AccessDenied(message),
        StatusCode::BAD_REQUEST => TransportError::Validation(message),
        StatusCode::NOT_FOUND => TransportError::NotFound(message),
        _ => TransportError::Service(message),
    }
}

// -----------------------------------------------------------------------------
// Bedrock control-plane DTOs
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    model_summaries: Vec<ModelSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailResponse {
    model_details: ModelDetails,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "Message")]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpTransport {
        HttpTransport::new("eu-central-2", "key".into()).unwrap()
    }

    #[test]
    fn test_invoke_url_encodes_model_id() {
        let url = transport()
            .invoke_url("anthropic.claude-3-haiku-20240307-v1:0")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://bedrock-runtime.eu-central-2.amazonaws.com/model/anthropic.claude-3-haiku-20240307-v1:0/invoke"
        );
    }

    #[test]
    fn test_invoke_url_escapes_slashes() {
        // Inference profile ARNs contain '/', which must stay inside one segment
        let url = transport()
            .invoke_url("arn:aws:bedrock:eu-central-2:1:inference-profile/eu.claude")
            .unwrap();
        assert!(url.path().contains("inference-profile%2Feu.claude"));
    }

    #[test]
    fn test_model_urls() {
        let t = transport();
        assert_eq!(
            t.model_url(None).unwrap().as_str(),
            "https://bedrock.eu-central-2.amazonaws.com/foundation-models"
        );
        assert_eq!(
            t.model_url(Some("amazon.titan-text-express-v1")).unwrap().as_str(),
            "https://bedrock.eu-central-2.amazonaws.com/foundation-models/amazon.titan-text-express-v1"
        );
    }

    #[test]
    fn test_custom_endpoints_with_trailing_slash() {
        let t = HttpTransport::with_endpoints("k".into(), "http://localhost:9000/", "http://localhost:9001").unwrap();
        assert_eq!(t.invoke_url("m").unwrap().as_str(), "http://localhost:9000/model/m/invoke");
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        assert!(HttpTransport::with_endpoints("k".into(), "not a url", "http://x").is_err());
    }

    #[test]
    fn test_classify_status() {
        let throttled = classify_status(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"message":"Too many requests, please wait before trying again."}"#.into(),
        );
        match throttled {
            TransportError::Throttled(msg) => assert!(msg.contains("Too many requests")),
            other => panic!("expected Throttled, got {:?}", other),
        }

        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, r#"{"Message":"denied"}"#.into()),
            TransportError::AccessDenied(ref m) if m.ends_with("denied")
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, "plain text".into()),
            TransportError::Validation(ref m) if m.ends_with("plain text")
        ));
        assert!(classify_status(StatusCode::NOT_FOUND, String::new()).is_not_found());
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, String::new()),
            TransportError::Service(_)
        ));
    }

    #[test]
    fn test_list_response_parses() {
        let listing: ListResponse = serde_json::from_str(
            r#"{"modelSummaries":[{"modelArn":"arn","modelId":"a","modelName":"A","providerName":"P","inputModalities":["TEXT"]}]}"#,
        )
        .unwrap();
        assert_eq!(listing.model_summaries.len(), 1);
        assert_eq!(listing.model_summaries[0].model_id, "a");
    }
}
