// ── Periodic collection ──

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::collector::Collector;
use crate::sink::PointSink;

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Run cycles for `collector` every `interval` until `cancel` fires.
///
/// The first cycle starts immediately. Cycles never overlap: a slow one
/// delays the next tick instead of stacking up. A failed cycle is logged
/// and the loop keeps going. The sink is locked only while emitting, so
/// several collectors can share it. Returns the number of cycles run.
pub async fn run_collector<S>(
    collector: Arc<Collector>,
    sink: Arc<Mutex<S>>,
    interval: Duration,
    cancel: CancellationToken,
) -> u64
where
    S: PointSink + ?Sized,
{
    let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycles = 0_u64;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                cycles += 1;
                let outcome = match collector.collect().await {
                    Ok((points, _latency)) => {
                        let mut sink = sink.lock().await;
                        collector.emit(&points, &mut *sink)
                    }
                    Err(e) => Err(e),
                };
                if let Err(e) = outcome {
                    warn!(collector = collector.name(), error = %e, "collection cycle failed");
                }
            }
        }
    }

    debug!(collector = collector.name(), cycles, "collector stopped");
    cycles
}
