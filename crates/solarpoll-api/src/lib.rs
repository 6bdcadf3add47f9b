// solarpoll-api: Async client for the SolarEdge monitoring API (equipment telemetry)

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{DEFAULT_API_BASE, FetchResponse, MonitoringClient, TIMESTAMP_FORMAT, redact};
pub use error::Error;
pub use models::{EquipmentResponse, PhaseData, Telemetry, TelemetryData};
pub use transport::{DEFAULT_RESPONSE_TIMEOUT, TransportConfig};
pub use url::Url;
