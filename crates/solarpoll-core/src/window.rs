// Trailing query window, recomputed every cycle.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;

/// Fixed lookback of every query: six days, exact.
pub const LOOKBACK: TimeDelta = TimeDelta::hours(6 * 24);

/// `[end - LOOKBACK, end]` with `end` the invocation time, both in the
/// site's zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TelemetryWindow {
    /// The window ending at `now`, rendered in `zone`.
    ///
    /// The lookback is a fixed duration, so across a DST change the local
    /// wall-clock difference is 143h or 145h.
    pub fn ending_at(now: DateTime<Utc>, zone: Tz) -> Self {
        let end = now.with_timezone(&zone);
        let start = end - LOOKBACK;
        Self { start, end }
    }

    /// Start as a zone-naive local time, for the query string.
    pub fn start_local(&self) -> NaiveDateTime {
        self.start.naive_local()
    }

    /// End as a zone-naive local time, for the query string.
    pub fn end_local(&self) -> NaiveDateTime {
        self.end.naive_local()
    }
}
