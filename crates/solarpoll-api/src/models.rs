// Equipment data response types
//
// Models for `GET /equipment/{site}/{serial}/data`. The payload nests one
// inverter's telemetry series under `data.telemetries`. Every struct is
// `#[serde(default)]` and numeric fields tolerate `null`: the API omits or
// nulls fields depending on inverter model and firmware, and a missing
// reading decodes to zero. Unknown fields are ignored, but every record
// must be a JSON object; arrays in their place are rejected.

use std::fmt;
use std::marker::PhantomData;

use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Deserialize `null` as the type's default instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Object-only decoding ─────────────────────────────────────────────
//
// Derived struct impls also accept a sequence of fields in declaration
// order. The records below derive with `remote = "Self"` and route the
// public `Deserialize` impl through a map-only visitor instead.

trait FromFields: Sized {
    fn from_fields<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>;
}

struct ObjectVisitor<T>(PhantomData<T>);

impl<'de, T: FromFields> Visitor<'de> for ObjectVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<T, A::Error> {
        T::from_fields(MapAccessDeserializer::new(map))
    }
}

macro_rules! object_only {
    ($($ty:ident),+) => {$(
        impl FromFields for $ty {
            fn from_fields<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                $ty::deserialize(deserializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_map(ObjectVisitor::<$ty>(PhantomData))
            }
        }
    )+};
}

object_only!(EquipmentResponse, TelemetryData, Telemetry, PhaseData);

// ── Response Envelope ────────────────────────────────────────────────

/// Top-level equipment data response.
///
/// ```json
/// { "data": { "count": 1, "telemetries": [ { "date": "...", ... } ] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", default)]
pub struct EquipmentResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub data: TelemetryData,
}

/// The telemetry series for one inverter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", default)]
pub struct TelemetryData {
    #[serde(deserialize_with = "null_as_default")]
    pub count: i64,
    /// Samples in the order the API returned them.
    #[serde(deserialize_with = "null_as_default")]
    pub telemetries: Vec<Telemetry>,
}

// ── Telemetry sample ─────────────────────────────────────────────────

/// One timestamped inverter reading.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct Telemetry {
    /// Zone-naive `YYYY-MM-DD HH:MM:SS`, local to the site's time zone.
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_active_power: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub dc_voltage: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ground_fault_resistance: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub power_limit: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_energy: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub temperature: f64,
    /// e.g. `"MPPT"`, `"THROTTLED"`, `"SLEEPING"`.
    #[serde(deserialize_with = "null_as_default")]
    pub inverter_mode: String,
    #[serde(rename = "L1Data", deserialize_with = "null_as_default")]
    pub l1_data: PhaseData,
}

/// Single-phase AC electrical readings nested inside a [`Telemetry`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct PhaseData {
    #[serde(deserialize_with = "null_as_default")]
    pub ac_current: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ac_voltage: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ac_frequency: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub apparent_power: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub active_power: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub reactive_power: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub cos_phi: f64,
}
