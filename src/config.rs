//! Configuration management for bedrock-bench
//!
//! Settings come from `~/.bedrock-bench/config.toml`, then environment
//! variables, then command-line flags. Read once at startup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::llm::types::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::usage::{PricingEntry, PricingTable};

/// Model used when none is given on the command line.
pub const DEFAULT_MODEL: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

/// Region used when neither config nor environment name one.
pub const DEFAULT_REGION: &str = "eu-central-2";

/// Per-model rate override (USD per 1K tokens)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RateOverride {
    pub input: f64,
    pub output: f64,
}

/// bedrock-bench configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Credentials profile; `None` uses the default credential chain
    pub profile: Option<String>,
    /// AWS region hosting the models
    pub region: String,
    /// Model invoked when none is specified
    pub default_model: String,
    /// Completion budget per invocation
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f64,
    /// Extra or replacement pricing entries, keyed by model id
    pub pricing: BTreeMap<String, RateOverride>,
    /// Bedrock API key; only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: None,
            region: DEFAULT_REGION.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            pricing: BTreeMap::new(),
            api_key: None,
        }
    }
}

impl Config {
    /// Get the config file path (~/.bedrock-bench/config.toml)
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".bedrock-bench").join("config.toml"))
    }

    /// Load from the default path plus the process environment.
    ///
    /// Values are not validated here; callers apply their own overrides first
    /// and then call [`Config::validate`].
    pub fn load() -> Result<Self> {
        Self::load_at(&Self::path()?, |key| std::env::var(key).ok())
    }

    /// Load from `path` (defaults if missing) and apply `lookup` overrides.
    pub fn load_at<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_from(path)?.unwrap_or_default();
        config.apply_env(lookup);
        Ok(config)
    }

    /// Write a default config to `path`. An existing file is left alone
    /// unless `force` is set; its contents are never read.
    ///
    /// Returns whether the file was written.
    pub fn init_at(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Load config from `path`, or return None if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(Some(config))
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in practice.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(profile) = lookup("AWS_PROFILE") {
            self.profile = Some(profile);
        }
        if let Some(region) = lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION")) {
            self.region = region;
        }
        if let Some(model) = lookup("BEDROCK_MODEL_ID") {
            self.default_model = model;
        }
        if let Some(key) = lookup("AWS_BEARER_TOKEN_BEDROCK") {
            self.api_key = Some(key);
        }
    }

    /// Reject values the gateway would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            anyhow::bail!("region must not be empty");
        }
        if self.default_model.trim().is_empty() {
            anyhow::bail!("default_model must not be empty");
        }
        if self.max_tokens == 0 {
            anyhow::bail!("max_tokens must be positive");
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            anyhow::bail!("temperature must be within [0, 1], got {}", self.temperature);
        }
        for (model, rate) in &self.pricing {
            if rate.input < 0.0 || rate.output < 0.0 {
                anyhow::bail!("pricing for {} must not be negative", model);
            }
        }
        Ok(())
    }

    /// Built-in pricing with this config's overrides applied.
    pub fn pricing_table(&self) -> PricingTable {
        let mut table = PricingTable::builtin();
        for (model_id, rate) in &self.pricing {
            table.insert(PricingEntry::new(model_id.clone(), rate.input, rate.output));
        }
        table
    }

    /// Which credential source will be used, for display.
    pub fn credentials_label(&self) -> String {
        match (&self.api_key, &self.profile) {
            (Some(_), _) => "Bedrock API key (AWS_BEARER_TOKEN_BEDROCK)".to_string(),
            (None, Some(profile)) => format!("profile '{}'", profile),
            (None, None) => "default credential chain".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.region, "eu-central-2");
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 8192);
        assert_eq!(config.temperature, 0.5);
        assert!(config.profile.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("AWS_PROFILE", "bench"),
            ("AWS_DEFAULT_REGION", "us-west-2"),
            ("BEDROCK_MODEL_ID", "anthropic.claude-3-haiku-20240307-v1:0"),
        ]));
        assert_eq!(config.profile.as_deref(), Some("bench"));
        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.default_model, "anthropic.claude-3-haiku-20240307-v1:0");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_aws_region_wins_over_default_region() {
        let mut config = Config::default();
        config.apply_env(env(&[("AWS_REGION", "us-east-1"), ("AWS_DEFAULT_REGION", "us-west-2")]));
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn test_blank_env_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("AWS_REGION", "  "), ("AWS_BEARER_TOKEN_BEDROCK", "")]));
        assert_eq!(config.region, DEFAULT_REGION);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = Config::default();
        config.apply_env(env(&[("AWS_BEARER_TOKEN_BEDROCK", "secret")]));
        assert_eq!(config.api_key.as_deref(), Some("secret"));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(!toml_str.contains("secret"));
        assert!(config.credentials_label().contains("API key"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            region = "us-east-1"

            [pricing."meta.llama3-8b-instruct-v1:0"]
            input = 0.0003
            output = 0.0006
            "#,
        )
        .unwrap();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.default_model, DEFAULT_MODEL);

        let table = config.pricing_table();
        let (entry, source) = table.resolve("meta.llama3-8b-instruct-v1:0");
        assert_eq!(source, crate::usage::PricingSource::Listed);
        assert_eq!(entry.output_rate, 0.0006);
    }

    #[test]
    fn test_save_and_load_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(Config::load_from(&path).unwrap().is_none());

        let mut config = Config::default();
        config.profile = Some("bench".into());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_tokens = \"lots\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.toml"));
    }

    #[test]
    fn test_out_of_range_file_loads_then_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "temperature = 2.0").unwrap();

        let config = Config::load_at(&path, env(&[])).unwrap();
        assert_eq!(config.temperature, 2.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_init_resets_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "temperature = 2.0\nmax_tokens = \"lots\"").unwrap();

        assert!(!Config::init_at(&path, false).unwrap());
        assert!(Config::load_from(&path).is_err());

        assert!(Config::init_at(&path, true).unwrap());
        let loaded = Config::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded, Config::default());
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.temperature = 2.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.max_tokens = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pricing.insert("m".into(), RateOverride { input: -1.0, output: 0.0 });
        assert!(config.validate().is_err());
    }
}
