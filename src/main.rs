//! bedrock-bench CLI
//!
//! Commands:
//!   invoke  - Send a prompt to a model and print the completion with usage
//!   list    - List available foundation models
//!   model   - Show metadata for one model
//!   compare - Benchmark prompts across models (tokens, cost, throughput)
//!   cost    - Tabulate token counts and cost per prompt size and model
//!   pricing - Show the pricing table
//!   config  - Show or initialise the configuration

use anyhow::{Context, Result};
use bedrock_bench::bench::prompts::{
    cost_prompts, label_prompts, to_owned_list, COMPARISON_MODELS, COMPARISON_PROMPTS, COST_MODELS,
    DEFAULT_PROMPT,
};
use bedrock_bench::bench::{CostTableBuilder, ModelComparison, RunEvent};
use bedrock_bench::report::{format_cost, render_comparison_summary, render_cost_table, render_grid};
use bedrock_bench::usage::PricingSource;
use bedrock_bench::{logging, Backend, CatalogError, Config, InvocationRequest, UsageAccountant};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "bedrock-bench")]
#[command(about = "Invoke Amazon Bedrock models and account for token usage and cost")]
#[command(version)]
struct Cli {
    /// Credentials profile (overrides config and AWS_PROFILE)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// AWS region (overrides config and AWS_REGION)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Debug logging for this tool
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a prompt to a model
    Invoke {
        /// Prompt text
        prompt: String,

        /// Model ID (defaults to the configured model)
        model_id: Option<String>,

        /// Maximum number of tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Sampling temperature in [0, 1]
        #[arg(long)]
        temperature: Option<f64>,
    },

    /// List available foundation models
    List,

    /// Show details for a foundation model
    Model {
        /// Model ID
        model_id: String,
    },

    /// Compare models across prompts (tokens, cost, throughput)
    Compare {
        /// Model to include (repeatable)
        #[arg(short, long = "model")]
        models: Vec<String>,

        /// Prompt to send (repeatable)
        #[arg(short, long = "prompt")]
        prompts: Vec<String>,

        /// Write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Tabulate token counts and cost per prompt size and model
    Cost {
        /// Model to include (repeatable)
        #[arg(short, long = "model")]
        models: Vec<String>,

        /// Prompt to send instead of the built-in suite (repeatable)
        #[arg(short, long = "prompt")]
        prompts: Vec<String>,
    },

    /// Show the pricing table
    Pricing,

    /// Show or initialise the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_event(event: RunEvent<'_>) {
    match event {
        RunEvent::Started { model_id, prompt } => {
            println!("\nTesting model: {}", model_id.bold());
            let preview: String = prompt.chars().take(100).collect();
            println!("Prompt: {}", preview.replace('\n', " "));
        }
        RunEvent::Finished {
            generated_text,
            stats,
            elapsed,
            ..
        } => {
            let preview: String = generated_text.chars().take(100).collect();
            let secs = elapsed.as_secs_f64();
            println!("Generated text: {}...", preview.replace('\n', " "));
            println!("Tokens In: {}", stats.tokens_in);
            println!("Tokens Out: {}", stats.tokens_out);
            println!("Total Tokens: {}", stats.context_window);
            println!("API Cost: {}", format_cost(stats.api_cost));
            println!("Inference Time: {:.2} seconds", secs);
            println!(
                "Tokens per Second: {:.2}",
                bedrock_bench::bench::comparison::throughput(stats.context_window, elapsed)
            );
        }
        RunEvent::Failed { error, .. } => {
            println!("{} {}", "Error:".red(), error);
        }
    }
}

fn or_defaults(given: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if given.is_empty() {
        to_owned_list(defaults)
    } else {
        given
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    // Resetting the file must work even when its current contents are invalid
    if let Some(Commands::Config {
        action: ConfigAction::Init { force },
    }) = &cli.command
    {
        let path = Config::path()?;
        if Config::init_at(&path, *force)? {
            println!("{} Wrote default configuration to {}", "✓".green(), path.display());
        } else {
            println!("Config already exists at {} (use --force to overwrite).", path.display());
        }
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(profile) = cli.profile {
        config.profile = Some(profile);
    }
    if let Some(region) = cli.region {
        config.region = region;
    }
    config.validate()?;

    let command = cli.command.unwrap_or_else(|| Commands::Invoke {
        prompt: DEFAULT_PROMPT.to_string(),
        model_id: None,
        max_tokens: None,
        temperature: None,
    });

    match command {
        Commands::Pricing => {
            let table = config.pricing_table();
            let headers: Vec<String> = ["Model", "Input / 1K", "Output / 1K"]
                .iter()
                .map(|s| s.to_string())
                .collect();
            let mut rows: Vec<Vec<String>> = table
                .entries()
                .iter()
                .map(|e| vec![e.model_id.clone(), format!("{}", e.input_rate), format!("{}", e.output_rate)])
                .collect();
            let fallback = table.fallback();
            rows.push(vec![
                "(any other model)".to_string(),
                format!("{}", fallback.input_rate),
                format!("{}", fallback.output_rate),
            ]);
            println!("{}", render_grid(&headers, &rows));
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let path = Config::path()?;
                println!("Config file: {}", path.display());
                println!("Credentials: {}\n", config.credentials_label());
                let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
                println!("{}", content);
            }
            // Handled before the config is loaded
            ConfigAction::Init { .. } => {}
        },

        Commands::List => {
            let backend = Backend::connect(&config).await?;
            let pb = spinner(format!("Listing models in {}...", config.region));
            let models = backend.model_catalog().list_models().await;
            pb.finish_and_clear();

            let models = models?;
            if models.is_empty() {
                println!("No foundation models available in {}.", config.region);
            } else {
                println!("Available models:");
                for model in &models {
                    println!("- {}: {}", model.model_id, model.display_name());
                }
            }
        }

        Commands::Model { model_id } => {
            let backend = Backend::connect(&config).await?;
            match backend.model_catalog().get_model(&model_id).await {
                Ok(details) => {
                    println!("Details for model {}:", model_id.bold());
                    println!("{}", serde_json::to_string_pretty(&details)?);
                }
                Err(CatalogError::NotFound(id)) => {
                    anyhow::bail!("Model '{}' not found in {}", id, config.region);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Invoke {
            prompt,
            model_id,
            max_tokens,
            temperature,
        } => {
            let backend = Backend::connect(&config).await?;
            let gateway = backend.gateway(config.default_model.clone());
            let accountant = UsageAccountant::new(config.pricing_table());

            let request = InvocationRequest::new(prompt)
                .max_tokens(max_tokens.unwrap_or(config.max_tokens))
                .temperature(temperature.unwrap_or(config.temperature));
            let request = match model_id {
                Some(id) => request.model(id),
                None => request,
            };
            let target = request.model_id.clone().unwrap_or_else(|| config.default_model.clone());

            let pb = spinner(format!("Invoking {}...", target));
            let outcome = gateway.invoke(&request).await;
            pb.finish_and_clear();

            let result = match outcome {
                Ok(result) => result,
                Err(e) => {
                    eprintln!("{} {}", "Error invoking model:".red(), e);
                    return Err(e.into());
                }
            };

            if result.generated_text.is_empty() {
                println!("No text generated.");
            } else {
                println!("Generated text: {}", result.generated_text);
            }

            let stats = accountant.account(&request.prompt, &result.generated_text, &result.model_id);
            println!();
            println!("Tokens In:      {}", stats.tokens_in);
            println!("Tokens Out:     {}", stats.tokens_out);
            println!("Context Window: {}", stats.context_window);
            println!("API Cost:       {}", format_cost(stats.api_cost));
            if stats.pricing_source == PricingSource::Fallback {
                println!("{}", "(no pricing entry for this model; default rates applied)".dimmed());
            }
            if result.tokens_in > 0 || result.tokens_out > 0 {
                println!(
                    "{}",
                    format!("Service-reported usage: {} in / {} out", result.tokens_in, result.tokens_out).dimmed()
                );
            }
        }

        Commands::Compare { models, prompts, json } => {
            let backend = Backend::connect(&config).await?;
            let gateway = backend.gateway(config.default_model.clone());
            let accountant = UsageAccountant::new(config.pricing_table());
            let models = or_defaults(models, COMPARISON_MODELS);
            let prompts = or_defaults(prompts, COMPARISON_PROMPTS);

            let report = ModelComparison::new(&gateway, &accountant)
                .sampling(config.max_tokens, config.temperature)
                .run(&prompts, &models, print_event)
                .await;

            println!("\n{}", render_comparison_summary(&report));

            if let Some(path) = json {
                let content = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
                std::fs::write(&path, content)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                println!("{} Report written to {}", "✓".green(), path.display());
            }

            let failures = report.failure_count();
            if failures > 0 {
                anyhow::bail!(
                    "{} of {} calls failed",
                    failures,
                    failures + report.record_count()
                );
            }
        }

        Commands::Cost { models, prompts } => {
            let backend = Backend::connect(&config).await?;
            let gateway = backend.gateway(config.default_model.clone());
            let accountant = UsageAccountant::new(config.pricing_table());
            let models = or_defaults(models, COST_MODELS);
            let prompts = if prompts.is_empty() {
                cost_prompts()
            } else {
                label_prompts(&prompts)
            };

            let table = CostTableBuilder::new(&gateway, &accountant)
                .sampling(config.max_tokens, config.temperature)
                .build(&prompts, &models, |event| {
                    match event {
                        RunEvent::Started { model_id, .. } => {
                            println!("Testing {} ...", model_id);
                        }
                        RunEvent::Failed { model_id, error, .. } => {
                            println!("{} {}: {}", "Error:".red(), model_id, error);
                        }
                        RunEvent::Finished { .. } => {}
                    }
                })
                .await;

            println!("\n{}", render_cost_table(&table));
            for (i, model) in table.models.iter().enumerate() {
                println!("Total {}: {}", model, format_cost(table.total_cost(i)));
            }

            let failed = table.failed_cells();
            if failed > 0 {
                anyhow::bail!("{} of {} calls failed", failed, table.models.len() * table.rows.len());
            }
        }
    }

    Ok(())
}
