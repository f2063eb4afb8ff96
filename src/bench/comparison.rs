//! Throughput comparison: every prompt against every model, one call at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::RunEvent;
use crate::llm::types::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::llm::{InferenceGateway, InvocationRequest};
use crate::usage::{TokenEstimator, UsageAccountant};

/// Measurements for one successful prompt/model pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub model_id: String,
    pub prompt: String,
    pub generated_text: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub total_tokens: u64,
    pub api_cost: f64,
    /// Wall-clock seconds for the call
    pub inference_time: f64,
    pub tokens_per_second: f64,
}

impl RunRecord {
    /// First `max_chars` characters of the completion.
    pub fn preview(&self, max_chars: usize) -> String {
        self.generated_text.chars().take(max_chars).collect()
    }
}

/// A prompt/model pair whose call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    pub model_id: String,
    pub prompt: String,
    pub error: String,
}

/// Everything recorded for one model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRun {
    pub model_id: String,
    pub records: Vec<RunRecord>,
    pub failures: Vec<RunFailure>,
}

impl ModelRun {
    /// Mean of `metric` over successful records; `None` if there are none.
    pub fn average(&self, metric: Metric) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let sum: f64 = self.records.iter().map(|r| metric.value(r)).sum();
        Some(sum / self.records.len() as f64)
    }
}

/// Metrics summarised per model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TokensIn,
    TokensOut,
    TotalTokens,
    ApiCost,
    InferenceTime,
    TokensPerSecond,
}

impl Metric {
    pub fn all() -> [Metric; 6] {
        [
            Self::TokensIn,
            Self::TokensOut,
            Self::TotalTokens,
            Self::ApiCost,
            Self::InferenceTime,
            Self::TokensPerSecond,
        ]
    }

    /// Display name
    pub fn title(&self) -> &'static str {
        match self {
            Self::TokensIn => "Tokens In",
            Self::TokensOut => "Tokens Out",
            Self::TotalTokens => "Total Tokens",
            Self::ApiCost => "Api Cost",
            Self::InferenceTime => "Inference Time",
            Self::TokensPerSecond => "Tokens Per Second",
        }
    }

    pub fn value(&self, record: &RunRecord) -> f64 {
        match self {
            Self::TokensIn => record.tokens_in as f64,
            Self::TokensOut => record.tokens_out as f64,
            Self::TotalTokens => record.total_tokens as f64,
            Self::ApiCost => record.api_cost,
            Self::InferenceTime => record.inference_time,
            Self::TokensPerSecond => record.tokens_per_second,
        }
    }
}

/// Result of a full comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub runs: Vec<ModelRun>,
}

impl ComparisonReport {
    pub fn failure_count(&self) -> usize {
        self.runs.iter().map(|r| r.failures.len()).sum()
    }

    pub fn record_count(&self) -> usize {
        self.runs.iter().map(|r| r.records.len()).sum()
    }
}

/// Tokens per second, 0 for a zero-length interval.
pub fn throughput(total_tokens: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        total_tokens as f64 / secs
    } else {
        0.0
    }
}

/// Drives a comparison with a shared gateway and accountant.
pub struct ModelComparison<'a, E> {
    gateway: &'a InferenceGateway,
    accountant: &'a UsageAccountant<E>,
    max_tokens: u32,
    temperature: f64,
}

impl<'a, E: TokenEstimator> ModelComparison<'a, E> {
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

    /// Run every prompt against every model, in order. A failed call is
    /// recorded and the run moves on.
    pub async fn run<F>(&self, prompts: &[String], models: &[String], mut on_event: F) -> ComparisonReport
    where
        F: FnMut(RunEvent<'_>),
    {
        let mut runs = Vec::with_capacity(models.len());

        for model_id in models {
            let mut run = ModelRun {
                model_id: model_id.clone(),
                ..Default::default()
            };

            for prompt in prompts {
                on_event(RunEvent::Started { model_id, prompt });

                let request = InvocationRequest::new(prompt.as_str())
                    .model(model_id.as_str())
                    .max_tokens(self.max_tokens)
                    .temperature(self.temperature);
                let start = Instant::now();
                let outcome = self.gateway.invoke(&request).await;
                let elapsed = start.elapsed();

                match outcome {
                    Ok(result) => {
                        let stats = self.accountant.account(prompt, &result.generated_text, model_id);
                        let record = RunRecord {
                            model_id: model_id.clone(),
                            prompt: prompt.clone(),
                            generated_text: result.generated_text,
                            tokens_in: stats.tokens_in,
                            tokens_out: stats.tokens_out,
                            total_tokens: stats.context_window,
                            api_cost: stats.api_cost,
                            inference_time: elapsed.as_secs_f64(),
                            tokens_per_second: throughput(stats.context_window, elapsed),
                        };
                        on_event(RunEvent::Finished {
                            model_id,
                            prompt,
                            generated_text: &record.generated_text,
                            stats: &stats,
                            elapsed,
                        });
                        run.records.push(record);
                    }
                    Err(e) => {
                        let failure = RunFailure {
                            model_id: model_id.clone(),
                            prompt: prompt.clone(),
                            error: e.to_string(),
                        };
                        on_event(RunEvent::Failed {
                            model_id,
                            prompt,
                            error: &failure.error,
                        });
                        run.failures.push(failure);
                    }
                }
            }

            runs.push(run);
        }

        ComparisonReport {
            generated_at: Utc::now(),
            runs,
        }
    }
}
