//! Candle aggregation for the candela candle pipeline.
//!
//! This crate provides tick-to-candle aggregation and candle rollup:
//!
//! - [`Candle`] - OHLC candle data structure
//! - [`Aggregator`] - Per-ticker streaming aggregator for one period
//! - [`Observation`] - Events an aggregator can consume (prices and candles)

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod candle;
mod observation;

pub use aggregator::Aggregator;
pub use candle::Candle;
pub use observation::Observation;
