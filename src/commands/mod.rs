mod browse;
mod config;
mod create;
mod delete;
mod edit;
mod ls;
mod show;
mod status;

pub use browse::{BrowseCommand, Flow, cmd_browse, execute};
pub use config::{cmd_config_get, cmd_config_path, cmd_config_set, cmd_config_show};
pub use create::cmd_create;
pub use delete::cmd_delete;
pub use edit::cmd_edit;
pub use ls::{LsOptions, cmd_ls};
pub use show::cmd_show;
pub use status::cmd_status;

use serde_json::Value;

use crate::cli::OutputOptions;
use crate::client::HttpBackend;
use crate::config::Config;
use crate::error::Result;

/// Result of a command: JSON for `--json`, text for humans.
///
/// Commands without a dedicated text form print their JSON either way.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => println!("{text}"),
            _ => println!("{}", serde_json::to_string_pretty(&self.json)?),
        }
        Ok(())
    }
}

/// Load configuration and build the HTTP backend it describes.
pub fn connect(url_override: Option<&str>) -> Result<(HttpBackend, Config)> {
    let config = Config::load()?;
    let backend = HttpBackend::from_config(&config, url_override)?;
    tracing::debug!(base_url = %backend.base_url(), "using backend");
    Ok((backend, config))
}
