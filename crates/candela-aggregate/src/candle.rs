//! OHLC candle data structure.

use candela_types::{Period, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLC candle for one ticker and one bucket.
///
/// A candle is opened by the first observation in its bucket and mutated by
/// later observations in the same bucket. Once an aggregator hands it out it
/// is closed and never touched again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Instrument ticker.
    pub ticker: String,
    /// Aggregation period.
    pub period: Period,
    /// First observed price in the bucket.
    pub open: f64,
    /// Highest observed price in the bucket.
    pub high: f64,
    /// Lowest observed price in the bucket.
    pub low: f64,
    /// Last observed price in the bucket.
    pub close: f64,
    /// Bucket start time.
    pub bucket_start: DateTime<Utc>,
    /// Number of raw prices folded into the candle.
    pub tick_count: u64,
}

impl Candle {
    /// Opens a candle from a single price.
    #[must_use]
    pub fn from_price(period: Period, price: &Price) -> Self {
        Self {
            ticker: price.ticker.clone(),
            period,
            open: price.value,
            high: price.value,
            low: price.value,
            close: price.value,
            bucket_start: period.bucket_start(price.timestamp),
            tick_count: 1,
        }
    }

    /// Re-buckets a closed candle of a finer period into `period`.
    ///
    /// OHLC values and the tick count carry over unchanged.
    #[must_use]
    pub fn from_candle(period: Period, candle: &Self) -> Self {
        Self {
            period,
            bucket_start: period.bucket_start(candle.bucket_start),
            ..candle.clone()
        }
    }

    /// Folds a price into the candle.
    ///
    /// The price must fall into this candle's bucket; this is not checked.
    pub fn merge_price(&mut self, price: &Price) {
        self.high = self.high.max(price.value);
        self.low = self.low.min(price.value);
        self.close = price.value;
        self.tick_count = self.tick_count.saturating_add(1);
    }

    /// Folds a later candle of the same or a finer period into this one.
    ///
    /// The other candle must fall into this candle's bucket; this is not checked.
    pub fn merge_candle(&mut self, other: &Self) {
        self.high = self.high.max(other.high);
        self.low = self.low.min(other.low);
        self.close = other.close;
        self.tick_count = self.tick_count.saturating_add(other.tick_count);
    }

    /// Returns the exclusive end of the candle's bucket.
    #[must_use]
    pub fn bucket_end(&self) -> Option<DateTime<Utc>> {
        self.bucket_start.checked_add_signed(self.period.duration())
    }

    /// Returns true if `low <= open, close <= high` and all prices are finite.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
            && self.low <= self.open.min(self.close)
            && self.open.max(self.close) <= self.high
    }
}

impl std::fmt::Display for Candle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{:.6},{:.6},{:.6},{:.6}",
            self.ticker,
            self.bucket_start.format("%Y-%m-%dT%H:%M:%SZ"),
            self.open,
            self.high,
            self.low,
            self.close
        )
    }
}
