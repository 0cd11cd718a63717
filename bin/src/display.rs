//! Display utilities and sink construction for the candela CLI.

use anyhow::{Context, Result};
use candela_lib::prelude::*;
use std::path::Path;

/// Create one file sink per period inside `dir`.
pub(crate) async fn file_sinks(
    dir: &Path,
    periods: &[Period],
    format: OutputFormat,
) -> Result<Vec<Box<dyn Sink>>> {
    let mut sinks: Vec<Box<dyn Sink>> = Vec::with_capacity(periods.len());
    for &period in periods {
        let sink: Box<dyn Sink> = match format {
            OutputFormat::Csv => {
                Box::new(FileSink::for_period(dir, period, CsvFormatter::new()).await?)
            }
            OutputFormat::Tsv => {
                Box::new(FileSink::for_period(dir, period, CsvFormatter::tsv()).await?)
            }
            OutputFormat::Ndjson => {
                Box::new(FileSink::for_period(dir, period, JsonFormatter::new()).await?)
            }
        };
        sinks.push(sink);
    }
    Ok(sinks)
}

/// Build a validated pipeline config from period identifiers.
pub(crate) fn parse_periods(periods: &[String], capacity: usize) -> Result<PipelineConfig> {
    let config = PipelineConfig::from_period_strs(periods)
        .context("Invalid period chain")?
        .with_channel_capacity(capacity);
    config.validate().context("Invalid pipeline configuration")?;
    Ok(config)
}

/// Print a per-stage summary table.
pub(crate) fn print_reports(reports: &[StageReport]) {
    println!(
        "{:<8} {:>10} {:>8} {:>10} {:>8} {:>12}",
        "PERIOD", "RECEIVED", "DROPPED", "ROLLOVER", "FLUSHED", "SINK ERRORS"
    );
    println!("{}", "-".repeat(61));
    for report in reports {
        println!(
            "{:<8} {:>10} {:>8} {:>10} {:>8} {:>12}",
            report.period,
            report.received,
            report.dropped,
            report.emitted,
            report.flushed,
            report.sink_failures
        );
    }
}
