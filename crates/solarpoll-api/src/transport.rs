// Transport configuration for building the reqwest::Client.
//
// The monitoring client builds its HTTP client lazily from this config on
// first use and keeps it for every later cycle.

use std::time::Duration;

use crate::error::Error;

/// Timeout applied when the configuration leaves it unset (or zero).
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Bounds both the wait for response data and the whole request.
    pub response_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Create a config with the given response timeout.
    ///
    /// A zero duration means "unset" and falls back to
    /// [`DEFAULT_RESPONSE_TIMEOUT`].
    pub fn new(response_timeout: Duration) -> Self {
        let response_timeout = if response_timeout.is_zero() {
            DEFAULT_RESPONSE_TIMEOUT
        } else {
            response_timeout
        };
        Self { response_timeout }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.response_timeout)
            .read_timeout(self.response_timeout)
            .user_agent(concat!("solarpoll/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}
