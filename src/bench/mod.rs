//! Benchmarks over several prompts and models.
//!
//! Both drivers issue one call at a time and keep going when a call fails.

pub mod comparison;
pub mod cost_table;
pub mod prompts;

use std::time::Duration;

use crate::usage::UsageStats;

pub use comparison::{ComparisonReport, Metric, ModelComparison, ModelRun, RunFailure, RunRecord};
pub use cost_table::{column_labels, short_model_label, CostCell, CostRow, CostTable, CostTableBuilder};
pub use prompts::LabelledPrompt;

/// Progress notifications emitted while a benchmark runs.
#[derive(Debug, Clone, Copy)]
pub enum RunEvent<'a> {
    Started {
        model_id: &'a str,
        prompt: &'a str,
    },
    Finished {
        model_id: &'a str,
        prompt: &'a str,
        generated_text: &'a str,
        stats: &'a UsageStats,
        elapsed: Duration,
    },
    Failed {
        model_id: &'a str,
        prompt: &'a str,
        error: &'a str,
    },
}
