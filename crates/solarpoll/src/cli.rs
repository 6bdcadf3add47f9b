//! Clap derive structures for the `solarpoll` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// solarpoll -- inverter telemetry collector for the SolarEdge monitoring API
#[derive(Debug, Parser)]
#[command(
    name = "solarpoll",
    version,
    about = "Poll inverter telemetry from the SolarEdge monitoring API",
    long_about = "Fetches the trailing six days of equipment telemetry for each configured\n\
        inverter and writes one metric point per sample to stdout.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file
    #[arg(long, short = 'c', env = "SOLARPOLL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// InfluxDB line protocol
    Line,
    /// One JSON object per line
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll every configured input on the configured interval until Ctrl-C
    Run,

    /// Run a single collection cycle and exit
    Once(OnceArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct OnceArgs {
    /// Only poll the input with this name
    #[arg(long, short = 'i')]
    pub input: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration (API keys redacted)
    Show,

    /// Print a commented sample configuration
    Sample,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_once_with_input_filter() {
        let cli = Cli::try_parse_from(["solarpoll", "-vv", "once", "--input", "roof"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cli.global.verbose, 2);
        match cli.command {
            Command::Once(args) => assert_eq!(args.input.as_deref(), Some("roof")),
            other => panic!("expected once, got {other:?}"),
        }
    }

    #[test]
    fn output_flag_is_global() {
        let cli = Cli::try_parse_from(["solarpoll", "run", "--output", "json"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cli.global.output, Some(OutputFormat::Json));
    }
}
