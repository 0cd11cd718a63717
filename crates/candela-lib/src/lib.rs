//! Real-time tick-to-candle aggregation with cascading rollups.
//!
//! This is a facade crate that re-exports functionality from the candela
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use candela_lib::prelude::*;
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::from_period_strs(&["1m", "2m", "10m"])?;
//!     let mut sinks: Vec<Box<dyn Sink>> = Vec::new();
//!     for period in &config.periods {
//!         let sink = FileSink::for_period(".".as_ref(), *period, CsvFormatter::new()).await?;
//!         sinks.push(Box::new(sink));
//!     }
//!
//!     let (tx, rx) = mpsc::channel(1024);
//!     let cancel = CancellationToken::new();
//!     let pipeline = Pipeline::spawn(&config, rx, sinks, cancel.clone())?;
//!
//!     let generator = PriceGenerator::new(GeneratorConfig::default())?;
//!     tokio::spawn(generator.run(tx, cancel.clone()));
//!     tokio::signal::ctrl_c().await?;
//!     cancel.cancel();
//!
//!     for report in pipeline.join().await? {
//!         println!("{}: {} candles", report.period, report.candles());
//!     }
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use candela_types::*;

// Re-export aggregation
pub use candela_aggregate::{Aggregator, Candle, Observation};

// Re-export formatters
#[cfg(feature = "format")]
pub use candela_format::{CsvFormatter, FormatError, Formatter, JsonFormatter, OutputFormat};

// Re-export the pipeline
#[cfg(feature = "pipeline")]
pub use candela_pipeline::{
    ChannelSink, DEFAULT_CHANNEL_CAPACITY, FileSink, GeneratorConfig, Pipeline, PipelineConfig,
    PipelineHandle, PriceGenerator, Shutdown, Sink, SinkError, Stage, StageReport,
};

/// Prelude module for convenient imports.
///
/// ```
/// use candela_lib::prelude::*;
/// ```
pub mod prelude {
    pub use candela_types::{CandelaError, ConfigError, MalformedInputError, Period, Price, Result};

    pub use candela_aggregate::{Aggregator, Candle};

    #[cfg(feature = "format")]
    pub use candela_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(feature = "pipeline")]
    pub use candela_pipeline::{
        ChannelSink, FileSink, GeneratorConfig, Pipeline, PipelineConfig, PriceGenerator, Sink,
        StageReport,
    };
}
