// Configuration loader
// Loads API keys from ~/.redraft/config.toml or environment variables

use anyhow::{bail, Context, Result};
use std::fs;

use super::settings::Config;

/// Load configuration from the redraft config file or environment.
pub fn load_config() -> Result<Config> {
    if let Some(config) = try_load_from_file()? {
        return Ok(config);
    }

    // Fall back to environment variables
    let anthropic = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
    let tavily = std::env::var("TAVILY_API_KEY").unwrap_or_default();
    if !anthropic.is_empty() && !tavily.is_empty() {
        return Ok(Config::new(anthropic, tavily));
    }

    bail!(
        "No configuration found. Create ~/.redraft/config.toml:\n\n\
        anthropic_api_key = \"sk-ant-...\"\n\
        tavily_api_key = \"tvly-...\"\n\n\
        Optional keys: model, max_tokens, results_per_query.\n\n\
        Alternatively, set environment variables:\n\
        export ANTHROPIC_API_KEY=\"sk-ant-...\"\n\
        export TAVILY_API_KEY=\"tvly-...\""
    );
}

fn try_load_from_file() -> Result<Option<Config>> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let config_path = home.join(".redraft/config.toml");

    if !config_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    parse_config(&contents).map(Some)
}

fn parse_config(contents: &str) -> Result<Config> {
    #[derive(serde::Deserialize)]
    struct TomlConfig {
        anthropic_api_key: String,
        tavily_api_key: String,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        max_tokens: Option<u32>,
        #[serde(default)]
        results_per_query: Option<usize>,
    }

    let parsed: TomlConfig = toml::from_str(contents).context("Failed to parse config.toml")?;

    let mut config = Config::new(parsed.anthropic_api_key, parsed.tavily_api_key);
    if let Some(model) = parsed.model {
        config.model = model;
    }
    if let Some(max_tokens) = parsed.max_tokens {
        config.max_tokens = max_tokens;
    }
    if let Some(results_per_query) = parsed.results_per_query {
        config.results_per_query = results_per_query;
    }

    Ok(config)
}
