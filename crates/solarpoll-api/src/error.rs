use thiserror::Error;

/// Top-level error type for the `solarpoll-api` crate.
///
/// Covers every failure mode of a single equipment-data request:
/// URL construction, transport, HTTP status, and payload decoding.
/// `solarpoll-core` maps these into the collector's cycle errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Request construction ────────────────────────────────────────
    /// The composed equipment URL is not a well-formed URL.
    #[error("Invalid server URL \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (DNS failure, connection refused, timeout, body read).
    ///
    /// The request URL is stripped before wrapping so the API key never
    /// ends up in a log line.
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The monitoring API answered with something other than `200 OK`.
    #[error("Response from url \"{url}\" has status code {status}, expected {expected}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        expected: u16,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request timed out at the transport layer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}
