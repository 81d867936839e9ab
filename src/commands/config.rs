//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print one value
//! - `config set`: Validate and store one value
//! - `config path`: Print the config file location

use owo_colors::{OwoColorize, Stream::Stdout};
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{CONFIG_KEYS, Config, URL_ENV};
use crate::error::Result;

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load_unchecked()?;
    let path = Config::config_path()?;

    let mut json_output = serde_json::to_value(&config)?;
    json_output["config_file"] = json!(path.to_string_lossy());

    let mut text_output = format!(
        "{}\n\n",
        "Configuration:".if_supports_color(Stdout, |t| t.cyan())
    );
    for key in CONFIG_KEYS {
        text_output.push_str(&format!(
            "  {}: {}\n",
            key.if_supports_color(Stdout, |t| t.cyan()),
            config.get(key)?
        ));
    }

    if let Ok(url) = std::env::var(URL_ENV)
        && !url.is_empty()
    {
        text_output.push_str(&format!(
            "\n{}\n",
            format!("base_url overridden by {URL_ENV}={url}")
                .if_supports_color(Stdout, |t| t.yellow())
        ));
    }

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", path.display()).if_supports_color(Stdout, |t| t.dimmed())
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Print a single configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load_unchecked()?;
    let value = config.get(key)?;

    CommandOutput::new(json!({
        "key": key,
        "value": value,
    }))
    .with_text(value)
    .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load_unchecked()?;
    config.set(key, value)?;
    config.save()?;

    let stored = config.get(key)?;
    tracing::debug!(key, value = %stored, "config updated");

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": stored,
        "success": true,
    }))
    .with_text(format!(
        "Set {} to {}",
        key.if_supports_color(Stdout, |t| t.cyan()),
        stored
    ))
    .print(output)
}

/// Print the path of the config file, whether or not it exists yet
pub fn cmd_config_path(output: OutputOptions) -> Result<()> {
    let path = Config::config_path()?;

    CommandOutput::new(json!({
        "path": path.to_string_lossy(),
        "exists": path.exists(),
    }))
    .with_text(path.display().to_string())
    .print(output)
}
