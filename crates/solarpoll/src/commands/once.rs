//! `once`: a single collection cycle per input.

use solarpoll_config::input_to_collector_config;
use solarpoll_core::Collector;
use tracing::{info, warn};

use crate::cli::{GlobalOpts, OnceArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &OnceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = super::load(global)?;
    let format = super::output_format(global, &cfg)?;

    let selected: Vec<_> = match args.input {
        Some(ref name) => cfg
            .inputs
            .iter()
            .enumerate()
            .filter(|(_, input)| &input.name == name)
            .collect(),
        None => cfg.inputs.iter().enumerate().collect(),
    };

    if selected.is_empty() {
        return Err(match args.input {
            Some(ref name) => CliError::InputNotFound {
                name: name.clone(),
                available: cfg
                    .inputs
                    .iter()
                    .map(|i| i.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            None => CliError::Validation {
                field: "inputs".into(),
                reason: "at least one [[inputs]] entry is required".into(),
            },
        });
    }

    let collectors = selected
        .into_iter()
        .map(|(index, input)| input_to_collector_config(input, index).map(Collector::new))
        .collect::<Result<Vec<_>, _>>()?;

    let mut sink = output::stdout_sink(format);
    let total = collectors.len();
    let mut failures = Vec::new();

    for collector in &collectors {
        match collector.gather(&mut sink).await {
            Ok(report) => info!(
                input = collector.name(),
                points = report.points,
                latency_secs = report.latency_secs,
                "input collected"
            ),
            Err(e) => {
                warn!(input = collector.name(), error = %e, "input failed");
                failures.push(CliError::from_cycle(collector.name(), e));
            }
        }
    }

    match failures.len() {
        0 => Ok(()),
        1 => Err(failures.remove(0)),
        count => Err(CliError::InputsFailed { count, total }),
    }
}
