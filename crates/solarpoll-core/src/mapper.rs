// ── Record mapping ──
//
// Turns a decoded equipment response into emitted points: one per
// sample, in API order, each stamped with the sample's local time
// re-read in the site's zone and the cycle's request latency.

use std::collections::BTreeMap;

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use indexmap::IndexMap;
use tracing::{trace, warn};

use solarpoll_api::{EquipmentResponse, TIMESTAMP_FORMAT, Telemetry};

use crate::config::SamplePolicy;
use crate::error::CoreError;
use crate::point::{EmittedPoint, FieldValue};

/// Field names of every emitted point, in emission order.
pub const FIELD_NAMES: [&str; 15] = [
    "response_time",
    "totalActivePower",
    "dcVoltage",
    "groundFaultResistance",
    "powerLimit",
    "totalEnergy",
    "temperature",
    "inverterMode",
    "acCurrent",
    "acVoltage",
    "acFrequency",
    "apparentPower",
    "activePower",
    "reactivePower",
    "cosPhi",
];

/// Parse a zone-naive `YYYY-MM-DD HH:MM:SS` string as a local time in `zone`.
///
/// A time repeated by a DST fold resolves to its earlier instant. A time
/// skipped by a DST gap is read with the offset in force before the gap,
/// which lands it after the transition.
pub fn parse_sample_time(value: &str, zone: Tz) -> Result<DateTime<Utc>, CoreError> {
    let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        CoreError::TimestampParse {
            value: value.to_owned(),
            source,
        }
    })?;

    let local = match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // Gaps are at most hours long; a day earlier is safely before it.
            let before_gap = zone
                .offset_from_utc_datetime(&(naive - TimeDelta::days(1)))
                .fix();
            let utc = naive - before_gap;
            Utc.from_utc_datetime(&utc)
        }
    };
    Ok(local)
}

fn sample_fields(sample: &Telemetry, latency_secs: f64) -> IndexMap<String, FieldValue> {
    let l1 = &sample.l1_data;
    let values: [FieldValue; 15] = [
        latency_secs.into(),
        sample.total_active_power.into(),
        sample.dc_voltage.into(),
        sample.ground_fault_resistance.into(),
        sample.power_limit.into(),
        sample.total_energy.into(),
        sample.temperature.into(),
        sample.inverter_mode.clone().into(),
        l1.ac_current.into(),
        l1.ac_voltage.into(),
        l1.ac_frequency.into(),
        l1.apparent_power.into(),
        l1.active_power.into(),
        l1.reactive_power.into(),
        l1.cos_phi.into(),
    ];
    FIELD_NAMES
        .iter()
        .map(|name| (*name).to_owned())
        .zip(values)
        .collect()
}

/// Map every sample of `response` to an [`EmittedPoint`].
///
/// Under [`SamplePolicy::Abort`] the first bad timestamp fails the call and
/// no points are returned. Under [`SamplePolicy::Skip`] bad samples are
/// dropped with a warning.
pub fn map_samples(
    response: &EquipmentResponse,
    zone: Tz,
    latency_secs: f64,
    measurement: &str,
    policy: SamplePolicy,
) -> Result<Vec<EmittedPoint>, CoreError> {
    let telemetries = &response.data.telemetries;
    let mut points = Vec::with_capacity(telemetries.len());

    for sample in telemetries {
        let timestamp = match parse_sample_time(&sample.date, zone) {
            Ok(ts) => ts,
            Err(e) if policy == SamplePolicy::Skip => {
                warn!(error = %e, "skipping telemetry sample");
                continue;
            }
            Err(e) => return Err(e),
        };

        let point = EmittedPoint {
            measurement: measurement.to_owned(),
            fields: sample_fields(sample, latency_secs),
            tags: BTreeMap::new(),
            timestamp,
        };
        trace!(timestamp = %point.timestamp, fields = ?point.fields, "mapped sample");
        points.push(point);
    }

    Ok(points)
}
