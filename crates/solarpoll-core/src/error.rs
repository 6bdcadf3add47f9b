// ── Core error types ──
//
// Cycle-level errors from solarpoll-core. Every variant is fatal to the
// cycle it occurs in. The `From<solarpoll_api::Error>` impl translates
// transport-layer errors into the collector's taxonomy.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Request construction ─────────────────────────────────────────
    #[error("Invalid server URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    // ── Network ──────────────────────────────────────────────────────
    #[error("Request to monitoring API failed: {reason}")]
    Network { reason: String, timed_out: bool },

    #[error("Monitoring API returned status {code}, expected {expected}")]
    UnexpectedStatus { code: u16, expected: u16 },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("Failed to decode equipment data: {message}")]
    Decode { message: String },

    #[error("Invalid telemetry timestamp \"{value}\": {source}")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    // ── Output ───────────────────────────────────────────────────────
    #[error("Failed to emit point: {message}")]
    Sink { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if the cycle failed on a transport timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { timed_out: true, .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<solarpoll_api::Error> for CoreError {
    fn from(err: solarpoll_api::Error) -> Self {
        match err {
            solarpoll_api::Error::InvalidUrl { url, source } => CoreError::InvalidUrl {
                url,
                reason: source.to_string(),
            },
            solarpoll_api::Error::ClientBuild(message) => CoreError::Config { message },
            solarpoll_api::Error::Transport(ref e) => CoreError::Network {
                reason: e.to_string(),
                timed_out: e.is_timeout(),
            },
            solarpoll_api::Error::UnexpectedStatus {
                status, expected, ..
            } => CoreError::UnexpectedStatus {
                code: status,
                expected,
            },
            solarpoll_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_keeps_code() {
        let err: CoreError = solarpoll_api::Error::UnexpectedStatus {
            url: "https://example.invalid/equipment/1/A/data".into(),
            status: 503,
            expected: 200,
        }
        .into();
        assert!(matches!(
            err,
            CoreError::UnexpectedStatus {
                code: 503,
                expected: 200
            }
        ));
    }

    #[test]
    fn deserialization_drops_body() {
        let err: CoreError = solarpoll_api::Error::Deserialization {
            message: "invalid type: sequence".into(),
            body: "[]".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Failed to decode equipment data: invalid type: sequence"
        );
    }
}
