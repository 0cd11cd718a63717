//! Price observations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped price observation for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Instrument ticker (e.g. `AAPL`).
    pub ticker: String,
    /// Observed price.
    pub value: f64,
    /// Observation time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Price {
    /// Creates a new price observation.
    #[must_use]
    pub fn new(ticker: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            ticker: ticker.into(),
            value,
            timestamp,
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} @ {}",
            self.ticker,
            self.value,
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ")
        )
    }
}
