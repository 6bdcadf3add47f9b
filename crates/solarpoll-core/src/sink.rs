// ── Point sinks ──
//
// Downstream consumers of emitted points. The collector hands over a
// cycle's points only after the whole cycle succeeded. Sinks stage what
// `add_point` receives and make it visible on `flush`, so a point that
// fails halfway through a cycle leaves no trace of that cycle.

use crate::error::CoreError;
use crate::point::EmittedPoint;

/// Receives emitted points, once per point, in sample order.
pub trait PointSink: Send {
    fn add_point(&mut self, point: &EmittedPoint) -> Result<(), CoreError>;

    /// Called once after the last point of a cycle.
    fn flush(&mut self) -> Result<(), CoreError> {
        Ok(())
    }

    /// Drop anything staged since the last flush.
    fn discard(&mut self) {}
}

impl<S: PointSink + ?Sized> PointSink for Box<S> {
    fn add_point(&mut self, point: &EmittedPoint) -> Result<(), CoreError> {
        (**self).add_point(point)
    }

    fn flush(&mut self) -> Result<(), CoreError> {
        (**self).flush()
    }

    fn discard(&mut self) {
        (**self).discard();
    }
}

/// In-memory sink that keeps every flushed point.
#[derive(Debug, Default)]
pub struct MemorySink {
    points: Vec<EmittedPoint>,
    staged: Vec<EmittedPoint>,
    flushes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[EmittedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of completed cycles that reached this sink.
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl PointSink for MemorySink {
    fn add_point(&mut self, point: &EmittedPoint) -> Result<(), CoreError> {
        self.staged.push(point.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CoreError> {
        self.points.append(&mut self.staged);
        self.flushes += 1;
        Ok(())
    }

    fn discard(&mut self) {
        self.staged.clear();
    }
}
