//! Run command implementation.
//!
//! Wires the price generator into a rollup pipeline with one file sink per
//! period, then waits for Ctrl-C (or `--duration`) and drains everything.

use crate::display::{file_sinks, parse_periods, print_reports};
use anyhow::{Context, Result, bail};
use candela_lib::prelude::*;
use std::{path::PathBuf, time::Duration};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Arguments for the run command.
#[derive(Debug)]
pub(crate) struct RunArgs {
    pub(crate) tickers: Vec<String>,
    pub(crate) periods: Vec<String>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) output_dir: PathBuf,
    pub(crate) format: OutputFormat,
    pub(crate) delay_ms: u64,
    pub(crate) factor: f64,
    pub(crate) seed: Option<u64>,
    pub(crate) duration: Option<u64>,
    pub(crate) capacity: usize,
}

/// Run the generator and pipeline until interrupted.
pub(crate) async fn run(args: RunArgs) -> Result<()> {
    if args.tickers.is_empty() || args.tickers.iter().any(|t| t.trim().is_empty()) {
        bail!("At least one non-empty ticker is required");
    }
    let generator = PriceGenerator::new(GeneratorConfig {
        tickers: args.tickers,
        factor: args.factor,
        delay: Duration::from_millis(args.delay_ms),
        seed: args.seed,
    })?;

    let config = match &args.config {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            PipelineConfig::from_json_str(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => parse_periods(&args.periods, args.capacity)?,
    };

    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;
    let sinks = file_sinks(&args.output_dir, &config.periods, args.format).await?;

    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let cancel = CancellationToken::new();
    let pipeline = Pipeline::spawn(&config, rx, sinks, cancel.clone())?;

    let source = tokio::spawn(generator.run(tx, cancel.clone()));

    info!(
        output_dir = %args.output_dir.display(),
        format = %args.format,
        "running; press Ctrl-C to stop"
    );
    wait_for_stop(args.duration).await;
    cancel.cancel();

    let sent = source.await.context("Price generator task failed")?;
    let reports = pipeline.join().await?;

    println!("\nGenerated {sent} prices\n");
    print_reports(&reports);
    println!(
        "\nOutput written to {} as {}",
        args.output_dir.display(),
        args.format
    );
    Ok(())
}

async fn wait_for_stop(duration: Option<u64>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    match duration {
        Some(secs) => {
            tokio::select! {
                () = ctrl_c => {}
                () = tokio::time::sleep(Duration::from_secs(secs)) => {}
            }
        }
        None => ctrl_c.await,
    }
}
