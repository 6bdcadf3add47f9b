// Monitoring API HTTP client
//
// Wraps `reqwest::Client` with equipment URL construction, status
// validation, latency measurement, and payload decoding. The underlying
// client is built lazily on the first request and reused afterwards.

use std::time::Instant;

use chrono::NaiveDateTime;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::EquipmentResponse;
use crate::transport::TransportConfig;

/// Public SolarEdge monitoring API root.
pub const DEFAULT_API_BASE: &str = "https://monitoringapi.solaredge.com";

/// Wire format of `startTime`, `endTime`, and each sample's `date`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const API_KEY_PARAM: &str = "api_key";

/// Raw body of a successful request plus the measured round-trip latency.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub body: Vec<u8>,
    /// Seconds from just before sending until response headers arrived.
    pub latency_secs: f64,
}

/// HTTP client for the monitoring API's equipment endpoint.
///
/// Holds the API base and key; every request is a single best-effort GET
/// with no retry.
#[derive(Debug)]
pub struct MonitoringClient {
    http: OnceCell<reqwest::Client>,
    transport: TransportConfig,
    api_base: String,
    api_key: SecretString,
}

impl MonitoringClient {
    /// Create a client that builds its `reqwest::Client` on first use.
    ///
    /// `api_base` is the API root (e.g. [`DEFAULT_API_BASE`]); it is only
    /// validated when a request URL is composed from it.
    pub fn new(
        api_base: impl Into<String>,
        api_key: SecretString,
        transport: TransportConfig,
    ) -> Self {
        Self {
            http: OnceCell::new(),
            transport,
            api_base: api_base.into(),
            api_key,
        }
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        api_base: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        Self {
            http: OnceCell::new_with(Some(http)),
            transport: TransportConfig::default(),
            api_base: api_base.into(),
            api_key,
        }
    }

    /// Whether the underlying HTTP client has been built yet.
    pub fn is_initialized(&self) -> bool {
        self.http.initialized()
    }

    /// The underlying HTTP client, built on first call.
    pub async fn http(&self) -> Result<&reqwest::Client, Error> {
        self.http
            .get_or_try_init(|| async {
                debug!(
                    timeout_ms = self.transport.response_timeout.as_millis(),
                    "building HTTP client"
                );
                self.transport.build_client()
            })
            .await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the equipment data URL for one inverter and time window:
    /// `{base}/equipment/{site}/{serial}/data?api_key=..&endTime=..&startTime=..`
    ///
    /// Timestamps are rendered as `YYYY-MM-DD HH:MM:SS` without an offset;
    /// the API interprets them in the site's local time.
    pub fn equipment_url(
        &self,
        site_id: &str,
        serial_number: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Url, Error> {
        let base = self.api_base.trim_end_matches('/');
        let raw = format!("{base}/equipment/{site_id}/{serial_number}/data");
        let mut url = Url::parse(&raw).map_err(|source| Error::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: raw,
                source: url::ParseError::RelativeUrlWithoutBase,
            });
        }

        // Keys in sorted order, the way form encoders usually emit them.
        url.query_pairs_mut()
            .append_pair(API_KEY_PARAM, self.api_key.expose_secret())
            .append_pair("endTime", &end.format(TIMESTAMP_FORMAT).to_string())
            .append_pair("startTime", &start.format(TIMESTAMP_FORMAT).to_string());

        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET and return the raw body with the measured latency.
    ///
    /// Anything other than `200 OK` is an [`Error::UnexpectedStatus`]; the
    /// body is dropped unread in that case.
    pub async fn fetch(&self, url: Url) -> Result<FetchResponse, Error> {
        let http = self.http().await?;
        let shown = redact(&url);
        debug!(url = %shown, "GET equipment data");

        let started = Instant::now();
        let resp = http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.without_url()))?;
        let latency_secs = started.elapsed().as_secs_f64();

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                url: shown,
                status: status.as_u16(),
                expected: StatusCode::OK.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.without_url()))?
            .to_vec();
        trace!(bytes = body.len(), latency_secs, "response received");

        Ok(FetchResponse { body, latency_secs })
    }

    /// Decode an equipment data payload.
    pub fn decode(body: &[u8]) -> Result<EquipmentResponse, Error> {
        serde_json::from_slice(body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
        })
    }

    /// Build the URL, fetch it, and decode the response in one call.
    pub async fn equipment_data(
        &self,
        site_id: &str,
        serial_number: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<(EquipmentResponse, f64), Error> {
        let url = self.equipment_url(site_id, serial_number, start, end)?;
        let fetched = self.fetch(url).await?;
        let decoded = Self::decode(&fetched.body)?;
        Ok((decoded, fetched.latency_secs))
    }
}

/// Render a URL with the API key value masked.
pub fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == API_KEY_PARAM) {
        return url.to_string();
    }
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == API_KEY_PARAM {
                "REDACTED".to_owned()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
