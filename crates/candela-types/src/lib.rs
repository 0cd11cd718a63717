//! Core types for the candela candle pipeline.
//!
//! This crate provides the fundamental data structures used throughout candela:
//!
//! - [`Price`] - A single timestamped price observation
//! - [`Period`] - Candle period and bucket clock
//! - [`CandelaError`], [`ConfigError`], [`MalformedInputError`] - Error taxonomy

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod period;
mod price;

pub use error::{CandelaError, ConfigError, MalformedInputError, Result};
pub use period::Period;
pub use price::Price;
