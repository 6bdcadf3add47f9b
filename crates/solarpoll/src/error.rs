//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use solarpoll_config::ConfigError;
use solarpoll_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Collection ───────────────────────────────────────────────────
    #[error("Could not reach the monitoring API for input '{input}'")]
    #[diagnostic(
        code(solarpoll::connection_failed),
        help("Check network access and the input's api_base setting.")
    )]
    ConnectionFailed {
        input: String,
        #[source]
        source: CoreError,
    },

    #[error("Request for input '{input}' timed out")]
    #[diagnostic(
        code(solarpoll::timeout),
        help("Raise response_timeout for this input (default 5s).")
    )]
    Timeout {
        input: String,
        #[source]
        source: CoreError,
    },

    #[error("Collection for input '{input}' failed")]
    #[diagnostic(code(solarpoll::cycle_failed))]
    CycleFailed {
        input: String,
        #[source]
        source: CoreError,
    },

    #[error("{count} of {total} inputs failed")]
    #[diagnostic(
        code(solarpoll::partial_failure),
        help("See the warnings above for each failed input.")
    )]
    InputsFailed { count: usize, total: usize },

    #[error("No input named '{name}'")]
    #[diagnostic(
        code(solarpoll::input_not_found),
        help("Configured inputs: {available}")
    )]
    InputNotFound { name: String, available: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(solarpoll::validation))]
    Validation { field: String, reason: String },

    #[error("No API key configured for input '{input}'")]
    #[diagnostic(
        code(solarpoll::no_credentials),
        help(
            "Set api_key_env (or api_key) for the input,\n\
             or export SOLARPOLL_API_KEY."
        )
    )]
    NoCredentials { input: String },

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(solarpoll::no_config),
        help("Generate a starting point with: solarpoll config sample > {path}")
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(solarpoll::config))]
    Config(ConfigError),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::InputNotFound { .. } | Self::NoConfig { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach a failed cycle to the input it belongs to.
    pub fn from_cycle(input: &str, err: CoreError) -> Self {
        let input = input.to_owned();
        match err {
            CoreError::Network { .. } if err.is_timeout() => Self::Timeout { input, source: err },
            CoreError::Network { .. } => Self::ConnectionFailed { input, source: err },
            _ => Self::CycleFailed { input, source: err },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { input } => Self::NoCredentials { input },
            ConfigError::NotFound { path } => Self::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}
