//! Candle periods and the bucket clock.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ConfigError;

/// Candle aggregation period.
///
/// Every period is a whole number of minutes. Buckets are aligned to the Unix
/// epoch, so a 10-minute bucket always starts at `hh:00`, `hh:10`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Period {
    /// 1-minute candles.
    #[serde(rename = "1m")]
    Minute1,
    /// 2-minute candles.
    #[serde(rename = "2m")]
    Minute2,
    /// 10-minute candles.
    #[serde(rename = "10m")]
    Minute10,
}

impl Period {
    /// Returns the period length in minutes.
    #[must_use]
    pub const fn minutes(&self) -> i64 {
        match self {
            Self::Minute1 => 1,
            Self::Minute2 => 2,
            Self::Minute10 => 10,
        }
    }

    /// Returns the period length in seconds.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.minutes() * 60
    }

    /// Returns the period length as a [`TimeDelta`].
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(self.minutes())
    }

    /// Returns the period as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute2 => "2m",
            Self::Minute10 => "10m",
        }
    }

    /// Returns all supported periods, finest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Minute1, Self::Minute2, Self::Minute10]
    }

    /// Returns true if `coarser` is a whole multiple of this period.
    ///
    /// Candles of this period can only be rolled up into periods it divides.
    #[must_use]
    pub const fn divides(&self, coarser: Self) -> bool {
        coarser.minutes() % self.minutes() == 0
    }

    /// Returns the start of the bucket containing `timestamp`.
    ///
    /// The timestamp is truncated down to the nearest multiple of the period
    /// since the Unix epoch; sub-second precision is dropped. Instants before
    /// the epoch are floored, not rounded toward zero.
    ///
    /// Every instant has a bucket: the earliest representable instant is
    /// itself aligned to every period, so flooring never leaves the range.
    #[must_use]
    pub fn bucket_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let width = self.seconds();
        let start = timestamp.timestamp().div_euclid(width) * width;
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(start)
    }

    /// Returns the exclusive end of the bucket containing `timestamp`.
    #[must_use]
    pub fn bucket_end(&self, timestamp: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.bucket_start(timestamp)
            .checked_add_signed(self.duration())
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Period {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "m1" | "minute" | "minute1" => Ok(Self::Minute1),
            "2m" | "m2" | "minute2" => Ok(Self::Minute2),
            "10m" | "m10" | "minute10" => Ok(Self::Minute10),
            _ => Err(ConfigError::UnknownPeriod(s.to_string())),
        }
    }
}
