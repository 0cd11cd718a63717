//! Staged candle rollup pipeline.
//!
//! This crate wires [`Aggregator`](candela_aggregate::Aggregator)s into a
//! chain of concurrently running stages:
//!
//! - [`Stage`] - One aggregator with its channels, sink and lifecycle
//! - [`Pipeline`] - Validates a [`PipelineConfig`] and spawns the chain
//! - [`Sink`] - Recorder of closed candles ([`FileSink`], [`ChannelSink`])
//! - [`PriceGenerator`] - Random-walk price source

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod pipeline;
mod sink;
mod source;
mod stage;

pub use config::{DEFAULT_CHANNEL_CAPACITY, PipelineConfig};
pub use pipeline::{Pipeline, PipelineHandle};
pub use sink::{ChannelSink, FileSink, Sink, SinkError};
pub use source::{GeneratorConfig, PriceGenerator};
pub use stage::{Shutdown, Stage, StageReport};
