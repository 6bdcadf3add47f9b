// solarpoll-core: Collection cycle between solarpoll-api and output sinks.

pub mod collector;
pub mod config;
pub mod error;
pub mod mapper;
pub mod point;
pub mod scheduler;
pub mod sink;
pub mod window;
pub mod zone;

// ── Primary re-exports ──────────────────────────────────────────────
pub use collector::{Collector, CycleReport, CycleStage};
pub use config::{CollectorConfig, SamplePolicy};
pub use error::CoreError;
pub use mapper::{FIELD_NAMES, map_samples, parse_sample_time};
pub use point::{EmittedPoint, FieldValue};
pub use scheduler::run_collector;
pub use sink::{MemorySink, PointSink};
pub use window::{LOOKBACK, TelemetryWindow};
pub use zone::resolve_zone;
