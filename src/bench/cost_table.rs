//! Cost table: token counts and estimated cost per labelled prompt and model.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::prompts::LabelledPrompt;
use super::RunEvent;
use crate::llm::types::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::llm::{InferenceGateway, InvocationRequest};
use crate::usage::{TokenEstimator, UsageAccountant};

/// Usage for one prompt on one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostCell {
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub api_cost: f64,
}

/// One prompt; `cells[i]` belongs to `CostTable::models[i]`, `None` if the call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub label: String,
    pub cells: Vec<Option<CostCell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    pub models: Vec<String>,
    pub rows: Vec<CostRow>,
}

impl CostTable {
    /// Summed cost per model over the cells that succeeded.
    pub fn total_cost(&self, model_index: usize) -> f64 {
        self.rows
            .iter()
            .filter_map(|row| row.cells.get(model_index).copied().flatten())
            .map(|cell| cell.api_cost)
            .sum()
    }

    pub fn failed_cells(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|cell| cell.is_none())
            .count()
    }
}

/// Short column label for a model id.
///
/// `anthropic.claude-3-haiku-20240307-v1:0` becomes `claude-3-haiku`: the
/// provider prefix, the date stamp and the version suffix are dropped.
pub fn short_model_label(model_id: &str) -> String {
    let mut parts: Vec<&str> = bare_model_name(model_id).split('-').collect();
    while parts.len() > 1 {
        let last = parts[parts.len() - 1];
        let is_version = last.starts_with('v')
            && last.len() > 1
            && last[1..].chars().all(|c| c.is_ascii_digit() || c == ':');
        let is_date = last.len() == 8 && last.chars().all(|c| c.is_ascii_digit());
        if is_version || is_date {
            parts.pop();
        } else {
            break;
        }
    }
    parts.join("-")
}

/// Model id without ARN path or provider prefix.
fn bare_model_name(model_id: &str) -> &str {
    let name = model_id.rsplit('/').next().unwrap_or(model_id);
    name.rsplit('.').next().unwrap_or(name)
}

/// Column labels for `models`, unique whenever the ids are.
///
/// Labels that would collide keep their date and version suffix; if that is
/// still ambiguous the full id is used.
pub fn column_labels(models: &[String]) -> Vec<String> {
    let short: Vec<String> = models.iter().map(|m| short_model_label(m)).collect();
    let bare: Vec<&str> = models.iter().map(|m| bare_model_name(m)).collect();

    models
        .iter()
        .enumerate()
        .map(|(i, model_id)| {
            if short.iter().filter(|l| **l == short[i]).count() == 1 {
                short[i].clone()
            } else if bare.iter().filter(|b| **b == bare[i]).count() == 1 {
                bare[i].to_string()
            } else {
                model_id.clone()
            }
        })
        .collect()
}

/// Fills a [`CostTable`] one call at a time, prompts outermost.
pub struct CostTableBuilder<'a, E> {
    gateway: &'a InferenceGateway,
    accountant: &'a UsageAccountant<E>,
    max_tokens: u32,
    temperature: f64,
}

impl<'a, E: TokenEstimator> CostTableBuilder<'a, E> {
    pub fn new(gateway: &'a InferenceGateway, accountant: &'a UsageAccountant<E>) -> Self {
        Self {
            gateway,
            accountant,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Sampling parameters sent with every request.
    pub fn sampling(mut self, max_tokens: u32, temperature: f64) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub async fn build<F>(&self, prompts: &[LabelledPrompt], models: &[String], mut on_event: F) -> CostTable
    where
        F: FnMut(RunEvent<'_>),
    {
        let mut rows = Vec::with_capacity(prompts.len());

        for labelled in prompts {
            let mut cells = Vec::with_capacity(models.len());
            for model_id in models {
                let prompt = labelled.prompt.as_str();
                on_event(RunEvent::Started { model_id, prompt });

                let request = InvocationRequest::new(prompt)
                    .model(model_id.as_str())
                    .max_tokens(self.max_tokens)
                    .temperature(self.temperature);
                let start = Instant::now();
                match self.gateway.invoke(&request).await {
                    Ok(result) => {
                        let stats = self.accountant.account(prompt, &result.generated_text, model_id);
                        on_event(RunEvent::Finished {
                            model_id,
                            prompt,
                            generated_text: &result.generated_text,
                            stats: &stats,
                            elapsed: start.elapsed(),
                        });
                        cells.push(Some(CostCell {
                            tokens_in: stats.tokens_in,
                            tokens_out: stats.tokens_out,
                            api_cost: stats.api_cost,
                        }));
                    }
                    Err(e) => {
                        let error = e.to_string();
                        on_event(RunEvent::Failed {
                            model_id,
                            prompt,
                            error: &error,
                        });
                        cells.push(None);
                    }
                }
            }
            rows.push(CostRow {
                label: labelled.label.clone(),
                cells,
            });
        }

        CostTable {
            models: models.to_vec(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::gateway::tests::{FakeRuntime, OK_BODY};
    use crate::llm::TransportError;
    use std::sync::Arc;

    const HAIKU: &str = "anthropic.claude-3-haiku-20240307-v1:0";
    const SONNET: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

    #[test]
    fn test_short_model_label() {
        assert_eq!(short_model_label(HAIKU), "claude-3-haiku");
        assert_eq!(short_model_label(SONNET), "claude-3-5-sonnet");
        assert_eq!(short_model_label("amazon.titan-text-express-v1"), "titan-text-express");
        assert_eq!(short_model_label("mistral.mistral-7b-instruct-v0:2"), "mistral-7b-instruct");
        assert_eq!(
            short_model_label("eu.anthropic.claude-3-5-sonnet-20240620-v1:0"),
            "claude-3-5-sonnet"
        );
        assert_eq!(
            short_model_label("arn:aws:bedrock:eu-central-2:123:inference-profile/eu.anthropic.claude-3-haiku-20240307-v1:0"),
            "claude-3-haiku"
        );
        assert_eq!(short_model_label("plain"), "plain");
    }

    #[test]
    fn test_label_keeps_non_version_v_words() {
        // "vision" starts with 'v' but is not a version
        assert_eq!(short_model_label("acme.model-vision-v2"), "model-vision");
    }

    #[test]
    fn test_column_labels_disambiguate_versions() {
        let models = vec![
            SONNET.to_string(),
            "anthropic.claude-3-5-sonnet-20241022-v2:0".to_string(),
            HAIKU.to_string(),
        ];
        assert_eq!(
            column_labels(&models),
            vec![
                "claude-3-5-sonnet-20240620-v1:0",
                "claude-3-5-sonnet-20241022-v2:0",
                "claude-3-haiku",
            ]
        );
    }

    #[test]
    fn test_column_labels_fall_back_to_full_id() {
        let models = vec![
            format!("eu.{}", HAIKU),
            format!("us.{}", HAIKU),
        ];
        assert_eq!(column_labels(&models), models);
    }

    #[tokio::test]
    async fn test_requests_carry_sampling_parameters() {
        let runtime = Arc::new(FakeRuntime::replying(OK_BODY));
        let gateway = InferenceGateway::new(runtime.clone(), SONNET);
        let accountant = UsageAccountant::default();
        let prompts = vec![LabelledPrompt::new("Short", "Hello world")];

        CostTableBuilder::new(&gateway, &accountant)
            .sampling(1024, 0.0)
            .build(&prompts, &[HAIKU.to_string()], |_| {})
            .await;

        let calls = runtime.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let sent: serde_json::Value = serde_json::from_slice(&calls[0].1).unwrap();
        assert_eq!(sent["max_tokens"], 1024);
        assert_eq!(sent["temperature"], 0.0);
    }

    #[tokio::test]
    async fn test_build_table_with_failure() {
        let runtime = Arc::new(
            FakeRuntime::replying(OK_BODY).with_reply(SONNET, Err(TransportError::Validation("too long".into()))),
        );
        let gateway = InferenceGateway::new(runtime.clone(), SONNET);
        let accountant = UsageAccountant::default();
        let prompts = vec![
            LabelledPrompt::new("Short", "Hello world"),
            LabelledPrompt::new("Long", "one two three four five"),
        ];
        let models = vec![SONNET.to_string(), HAIKU.to_string()];

        let mut order = Vec::new();
        let table = CostTableBuilder::new(&gateway, &accountant)
            .build(&prompts, &models, |event| {
                if let RunEvent::Started { model_id, prompt } = event {
                    order.push(format!("{}|{}", prompt, model_id));
                }
            })
            .await;

        assert_eq!(runtime.call_count(), 4);
        assert_eq!(order[0], format!("Hello world|{}", SONNET));
        assert_eq!(order[1], format!("Hello world|{}", HAIKU));

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].label, "Short");
        assert!(table.rows[0].cells[0].is_none());

        let haiku_short = table.rows[0].cells[1].unwrap();
        assert_eq!(haiku_short.tokens_in, 2);
        assert_eq!(haiku_short.tokens_out, 6);
        let expected = (2.0 * 0.00025 + 6.0 * 0.00125) / 1000.0;
        assert!((haiku_short.api_cost - expected).abs() < 1e-15);

        assert_eq!(table.failed_cells(), 2);
        assert_eq!(table.total_cost(0), 0.0);
        assert!(table.total_cost(1) > expected);
    }
}
