// ── Collector ──
//
// One polled inverter. Each cycle runs URL building, fetch, decode, and
// mapping in sequence; points reach the sink only when every stage
// succeeded.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use strum::Display;
use tracing::{debug, info};

use solarpoll_api::{MonitoringClient, TransportConfig, Url};

use crate::config::CollectorConfig;
use crate::error::CoreError;
use crate::mapper::map_samples;
use crate::point::EmittedPoint;
use crate::sink::PointSink;
use crate::window::TelemetryWindow;
use crate::zone::resolve_zone;

/// Pipeline stage of a running cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CycleStage {
    BuildingUrl,
    Fetching,
    Decoding,
    Mapping,
    Emitting,
}

/// Outcome of a successful cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub points: usize,
    pub latency_secs: f64,
}

/// Polls one inverter's equipment data.
///
/// Owns its HTTP client, which is built on the first cycle and reused
/// afterwards. Cycles are expected not to overlap.
#[derive(Debug)]
pub struct Collector {
    config: CollectorConfig,
    zone: Tz,
    client: MonitoringClient,
}

impl Collector {
    /// Create a collector. The time zone is resolved here, once.
    pub fn new(config: CollectorConfig) -> Self {
        let zone = resolve_zone(&config.time_zone);
        let client = MonitoringClient::new(
            config.api_base.clone(),
            config.api_key.clone(),
            TransportConfig::new(config.response_timeout),
        );
        Self {
            config,
            zone,
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The resolved site zone (UTC if the configured name was unknown).
    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn client(&self) -> &MonitoringClient {
        &self.client
    }

    /// The trailing window a cycle started at `now` would query.
    pub fn window(&self, now: DateTime<Utc>) -> TelemetryWindow {
        TelemetryWindow::ending_at(now, self.zone)
    }

    /// The request URL a cycle started at `now` would fetch.
    pub fn request_url(&self, now: DateTime<Utc>) -> Result<Url, CoreError> {
        let window = self.window(now);
        let url = self.client.equipment_url(
            &self.config.site_id,
            &self.config.serial_number,
            window.start_local(),
            window.end_local(),
        )?;
        Ok(url)
    }

    /// Run the fetch pipeline for a cycle starting now.
    pub async fn collect(&self) -> Result<(Vec<EmittedPoint>, f64), CoreError> {
        self.collect_at(Utc::now()).await
    }

    /// Run the fetch pipeline with an explicit invocation time.
    ///
    /// Returns the mapped points and the request latency in seconds.
    pub async fn collect_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Vec<EmittedPoint>, f64), CoreError> {
        let name = self.name();

        debug!(collector = name, stage = %CycleStage::BuildingUrl, "cycle stage");
        let url = self.request_url(now)?;

        debug!(collector = name, stage = %CycleStage::Fetching, "cycle stage");
        let fetched = self.client.fetch(url).await?;

        debug!(
            collector = name,
            stage = %CycleStage::Decoding,
            bytes = fetched.body.len(),
            "cycle stage"
        );
        let response = MonitoringClient::decode(&fetched.body)?;

        debug!(
            collector = name,
            stage = %CycleStage::Mapping,
            count = response.data.count,
            samples = response.data.telemetries.len(),
            "cycle stage"
        );
        let points = map_samples(
            &response,
            self.zone,
            fetched.latency_secs,
            &self.config.name,
            self.config.sample_policy,
        )?;

        Ok((points, fetched.latency_secs))
    }

    /// Hand a finished cycle's points to `sink`, in order.
    ///
    /// If any point is refused, everything staged for this cycle is
    /// discarded and nothing is flushed.
    pub fn emit<S>(&self, points: &[EmittedPoint], sink: &mut S) -> Result<(), CoreError>
    where
        S: PointSink + ?Sized,
    {
        debug!(
            collector = self.name(),
            stage = %CycleStage::Emitting,
            points = points.len(),
            "cycle stage"
        );
        for point in points {
            if let Err(e) = sink.add_point(point) {
                sink.discard();
                return Err(e);
            }
        }
        sink.flush().inspect_err(|_| sink.discard())
    }

    /// Run one full cycle: collect, then emit to `sink`.
    ///
    /// On error nothing from this cycle reaches the sink.
    pub async fn gather<S>(&self, sink: &mut S) -> Result<CycleReport, CoreError>
    where
        S: PointSink + ?Sized,
    {
        let (points, latency_secs) = self.collect().await?;
        self.emit(&points, sink)?;
        info!(
            collector = self.name(),
            points = points.len(),
            latency_secs,
            "cycle complete"
        );
        Ok(CycleReport {
            points: points.len(),
            latency_secs,
        })
    }
}
