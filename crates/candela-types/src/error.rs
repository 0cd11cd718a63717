//! Error types for candela.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::Period;

/// Result type alias for candela operations.
pub type Result<T> = std::result::Result<T, CandelaError>;

/// Errors that can occur while building or running a pipeline.
#[derive(Error, Debug)]
pub enum CandelaError {
    /// Invalid pipeline configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An inbound event was rejected.
    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),

    /// A stage task panicked or was aborted.
    #[error("Stage task for {period} failed: {reason}")]
    StageTask {
        /// Period of the failed stage.
        period: Period,
        /// Description of the failure.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal configuration errors, raised before any stage starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The period identifier is not supported.
    #[error("Unknown period '{0}', expected one of: 1m, 2m, 10m")]
    UnknownPeriod(String),

    /// No periods were configured.
    #[error("Pipeline needs at least one period")]
    EmptyChain,

    /// A period in the chain is not a strictly coarser multiple of its predecessor.
    #[error("Period {coarser} cannot roll up from {finer}")]
    NotCoarser {
        /// The upstream (finer) period.
        finer: Period,
        /// The downstream period that does not fit.
        coarser: Period,
    },

    /// The number of sinks does not match the number of periods.
    #[error("Expected one sink per period: {periods} periods, {sinks} sinks")]
    SinkCountMismatch {
        /// Number of configured periods.
        periods: usize,
        /// Number of sinks supplied.
        sinks: usize,
    },

    /// Channel capacity must be positive.
    #[error("Channel capacity must be greater than zero")]
    ZeroCapacity,

    /// Price generator scale must be a positive, finite number.
    #[error("Generator factor must be positive and finite, got {0}")]
    InvalidFactor(f64),
}

/// A rejected inbound event.
///
/// The event is dropped before it touches aggregator state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedInputError {
    /// The event carries no ticker.
    #[error("Event has an empty ticker")]
    EmptyTicker,

    /// A price field is NaN or infinite.
    #[error("Non-finite value {value} for {ticker}")]
    NonFiniteValue {
        /// Ticker of the event.
        ticker: String,
        /// The offending value.
        value: f64,
    },

    /// A candle violates `low <= open, close <= high`.
    #[error("Inconsistent candle bounds for {ticker}")]
    InvalidCandle {
        /// Ticker of the candle.
        ticker: String,
    },

    /// A candle cannot be rolled up into the target period.
    #[error("Cannot roll {source_period} candle for {ticker} into {target}")]
    PeriodMismatch {
        /// Ticker of the candle.
        ticker: String,
        /// Period of the incoming candle.
        source_period: Period,
        /// Period of the aggregator.
        target: Period,
    },

    /// The event belongs to a bucket older than the open candle.
    #[error("Out-of-order event for {ticker}: bucket {bucket} precedes open bucket {open}")]
    StaleBucket {
        /// Ticker of the event.
        ticker: String,
        /// Bucket computed for the event.
        bucket: DateTime<Utc>,
        /// Bucket of the currently open candle.
        open: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: CandelaError = ConfigError::EmptyChain.into();
        assert!(matches!(err, CandelaError::Config(ConfigError::EmptyChain)));
        assert_eq!(err.to_string(), "Pipeline needs at least one period");
    }

    #[test]
    fn test_not_coarser_message() {
        let err = ConfigError::NotCoarser {
            finer: Period::Minute10,
            coarser: Period::Minute2,
        };
        assert_eq!(err.to_string(), "Period 2m cannot roll up from 10m");
    }
}
