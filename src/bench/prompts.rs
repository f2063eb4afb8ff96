//! Built-in prompt suites and model lists.

use serde::{Deserialize, Serialize};

/// Prompt sent when the CLI runs without a subcommand.
pub const DEFAULT_PROMPT: &str = "\n\nHuman: What's the capital of France?\n\nAssistant:";

/// Prompts for the throughput comparison.
pub const COMPARISON_PROMPTS: &[&str] = &[
    "Explain the concept of quantum entanglement in simple terms.",
    "Write a short story about a robot learning to paint.",
    "Describe the process of photosynthesis step by step.",
    "Compare and contrast the Renaissance and the Enlightenment periods.",
    "Provide a brief history of the Internet and its impact on society.",
];

/// Models for the throughput comparison.
pub const COMPARISON_MODELS: &[&str] = &[
    "anthropic.claude-3-haiku-20240307-v1:0",
    "anthropic.claude-3-5-sonnet-20240620-v1:0",
];

/// Models for the cost table.
pub const COST_MODELS: &[&str] = &[
    "anthropic.claude-3-5-sonnet-20240620-v1:0",
    "anthropic.claude-3-haiku-20240307-v1:0",
];

const SUMMARY_PARAGRAPH: &str = "Artificial intelligence (AI) is intelligence demonstrated by machines, \
as opposed to natural intelligence displayed by animals including humans. AI research has been defined \
as the field of study of intelligent agents, which refers to any system that perceives its environment \
and takes actions that maximize its chance of achieving its goals.";

/// A prompt with a row label, e.g. "Short".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledPrompt {
    pub label: String,
    pub prompt: String,
}

impl LabelledPrompt {
    pub fn new(label: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prompt: prompt.into(),
        }
    }
}

/// Short / Medium / Long / Very Long prompts for the cost table.
pub fn cost_prompts() -> Vec<LabelledPrompt> {
    vec![
        LabelledPrompt::new("Short", "Translate 'Hello, how are you?' into French."),
        LabelledPrompt::new(
            "Medium",
            format!("Summarize the following paragraph:\n\n{}", SUMMARY_PARAGRAPH),
        ),
        LabelledPrompt::new(
            "Long",
            "Write a detailed essay about the impact of AI on cybersecurity in 2025. \
             Include at least three main points and provide examples for each.",
        ),
        LabelledPrompt::new(
            "Very Long",
            format!(
                "Given this legal contract (simulated 5000 words):\n\n{}",
                "Lorem ipsum ".repeat(500)
            ),
        ),
    ]
}

/// Label user-supplied prompts "Prompt 1", "Prompt 2", ...
pub fn label_prompts(prompts: &[String]) -> Vec<LabelledPrompt> {
    prompts
        .iter()
        .enumerate()
        .map(|(i, p)| LabelledPrompt::new(format!("Prompt {}", i + 1), p.clone()))
        .collect()
}

/// Owned copy of a static list.
pub fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
