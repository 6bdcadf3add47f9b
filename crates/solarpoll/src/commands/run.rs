//! `run`: poll every input on the configured interval until Ctrl-C.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use solarpoll_core::{Collector, run_collector};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = super::load(global)?;
    let format = super::output_format(global, &cfg)?;
    let configs = solarpoll_config::collector_configs(&cfg)?;

    let sink = Arc::new(Mutex::new(output::stdout_sink(format)));
    let cancel = CancellationToken::new();

    let mut tasks = JoinSet::new();
    for config in configs {
        let collector = Arc::new(Collector::new(config));
        info!(
            input = collector.name(),
            zone = %collector.zone(),
            interval = ?cfg.interval,
            "starting collector"
        );
        tasks.spawn(run_collector(
            collector,
            Arc::clone(&sink),
            cfg.interval,
            cancel.clone(),
        ));
    }

    let cycles = supervise(tasks, cancel, tokio::signal::ctrl_c()).await?;
    info!(cycles, "all collectors stopped");
    Ok(())
}

/// Wait for `shutdown`, then cancel every collector and join them.
///
/// Collectors only return once cancelled, so a failing `shutdown` future
/// still cancels them before its error is returned. Yields the total
/// number of cycles run.
async fn supervise<F>(
    mut tasks: JoinSet<u64>,
    cancel: CancellationToken,
    shutdown: F,
) -> Result<u64, CliError>
where
    F: Future<Output = std::io::Result<()>>,
{
    let signal = shutdown.await;
    match signal {
        Ok(()) => info!("interrupt received, shutting down"),
        Err(ref e) => warn!(error = %e, "failed to listen for Ctrl-C, shutting down"),
    }
    cancel.cancel();

    let mut cycles = 0_u64;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(n) => cycles += n,
            Err(e) => warn!(error = %e, "collector task ended abnormally"),
        }
    }

    signal?;
    Ok(cycles)
}
