//! Output formatters for the candela candle pipeline.
//!
//! This crate provides formatters for writing candle records:
//!
//! - [`CsvFormatter`] - CSV/TSV format
//! - [`JsonFormatter`] - Newline-delimited JSON format

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
pub use json::JsonFormatter;
