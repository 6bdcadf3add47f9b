//! Command handlers and the config plumbing they share.

pub mod config_cmd;
pub mod once;
pub mod run;

use clap::ValueEnum;
use solarpoll_config::Config;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Load the config from `--config` or the default location.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(solarpoll_config::load_config(global.config.as_deref())?)
}

/// `--output` wins over the config file's `output` key.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    OutputFormat::from_str(cfg.output.trim(), true).map_err(|_| CliError::Validation {
        field: "output".into(),
        reason: format!("expected \"line\" or \"json\", got \"{}\"", cfg.output),
    })
}
