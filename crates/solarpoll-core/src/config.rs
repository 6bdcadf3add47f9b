// ── Runtime collector configuration ──
//
// Describes *what* one collector polls and how. Carries the API key but
// never touches disk; the binary builds a `CollectorConfig` from
// solarpoll-config and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use solarpoll_api::{DEFAULT_API_BASE, DEFAULT_RESPONSE_TIMEOUT};

/// What to do with a sample whose `date` cannot be parsed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SamplePolicy {
    /// Fail the whole cycle; nothing from it is emitted.
    #[default]
    #[serde(alias = "abort_cycle")]
    #[strum(to_string = "abort", serialize = "abort_cycle")]
    Abort,
    /// Drop the offending sample and keep the rest.
    #[serde(alias = "skip_sample")]
    #[strum(to_string = "skip", serialize = "skip_sample")]
    Skip,
}

/// Configuration for one polled inverter.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Measurement name attached to every emitted point.
    pub name: String,
    /// Monitoring site identifier.
    pub site_id: String,
    /// Inverter serial number (e.g. `12345678-00`).
    pub serial_number: String,
    /// API key for the monitoring account.
    pub api_key: SecretString,
    /// IANA zone name the API's local timestamps are expressed in.
    pub time_zone: String,
    /// Response/request timeout. Zero means the default of 5s.
    pub response_timeout: Duration,
    /// API root, e.g. `https://monitoringapi.solaredge.com`.
    pub api_base: String,
    /// Invalid-timestamp handling.
    pub sample_policy: SamplePolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            name: "solaredge".into(),
            site_id: String::new(),
            serial_number: String::new(),
            api_key: SecretString::from(String::new()),
            time_zone: String::new(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            api_base: DEFAULT_API_BASE.into(),
            sample_policy: SamplePolicy::default(),
        }
    }
}
