//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

const REDACTED: &str = "********";

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let mut cfg = super::load(global)?;
            for input in &mut cfg.inputs {
                if input.api_key.is_some() {
                    input.api_key = Some(REDACTED.into());
                }
                if !input.zone_is_known() {
                    tracing::warn!(
                        input = %input.name,
                        time_zone = %input.time_zone,
                        "unknown time zone, samples will be read as UTC"
                    );
                }
            }
            let path = global
                .config
                .clone()
                .unwrap_or_else(solarpoll_config::config_path);
            println!("# {}", path.display());
            print!("{}", solarpoll_config::to_toml(&cfg)?);
            Ok(())
        }

        ConfigCommand::Sample => {
            print!("{}", solarpoll_config::sample_config());
            Ok(())
        }
    }
}
