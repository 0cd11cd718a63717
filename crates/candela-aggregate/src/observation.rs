//! Inputs an [`Aggregator`](crate::Aggregator) can consume.

use candela_types::{MalformedInputError, Period, Price};
use chrono::{DateTime, Utc};

use crate::Candle;

/// An event that can open or extend a candle.
///
/// Implemented for raw [`Price`]s (the head of a pipeline) and for closed
/// [`Candle`]s of a finer period (every rollup stage).
pub trait Observation: Send + 'static {
    /// Ticker the event belongs to.
    fn ticker(&self) -> &str;

    /// Instant used for bucketing.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Checks that the event may be aggregated at `period`.
    ///
    /// # Errors
    ///
    /// Returns the reason the event has to be dropped.
    fn validate(&self, period: Period) -> Result<(), MalformedInputError>;

    /// Opens a new candle at `period` from this event.
    fn open_candle(&self, period: Period) -> Candle;

    /// Folds this event into an open candle of the same bucket.
    fn merge_into(&self, candle: &mut Candle);
}

impl Observation for Price {
    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn validate(&self, _period: Period) -> Result<(), MalformedInputError> {
        if self.ticker.is_empty() {
            return Err(MalformedInputError::EmptyTicker);
        }
        if !self.value.is_finite() {
            return Err(MalformedInputError::NonFiniteValue {
                ticker: self.ticker.clone(),
                value: self.value,
            });
        }
        Ok(())
    }

    fn open_candle(&self, period: Period) -> Candle {
        Candle::from_price(period, self)
    }

    fn merge_into(&self, candle: &mut Candle) {
        candle.merge_price(self);
    }
}

impl Observation for Candle {
    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.bucket_start
    }

    fn validate(&self, period: Period) -> Result<(), MalformedInputError> {
        if self.ticker.is_empty() {
            return Err(MalformedInputError::EmptyTicker);
        }
        if !self.is_consistent() {
            return Err(MalformedInputError::InvalidCandle {
                ticker: self.ticker.clone(),
            });
        }
        if !self.period.divides(period) {
            return Err(MalformedInputError::PeriodMismatch {
                ticker: self.ticker.clone(),
                source_period: self.period,
                target: period,
            });
        }
        Ok(())
    }

    fn open_candle(&self, period: Period) -> Candle {
        Self::from_candle(period, self)
    }

    fn merge_into(&self, candle: &mut Candle) {
        candle.merge_candle(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_price_validation() {
        assert!(Price::new("NVDA", 1.0, noon()).validate(Period::Minute1).is_ok());
        assert_eq!(
            Price::new("", 1.0, noon()).validate(Period::Minute1),
            Err(MalformedInputError::EmptyTicker)
        );
        assert!(matches!(
            Price::new("NVDA", f64::INFINITY, noon()).validate(Period::Minute1),
            Err(MalformedInputError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_candle_must_divide_target_period() {
        let candle = Candle::from_price(Period::Minute10, &Price::new("NVDA", 1.0, noon()));

        assert!(candle.validate(Period::Minute10).is_ok());
        assert_eq!(
            candle.validate(Period::Minute2),
            Err(MalformedInputError::PeriodMismatch {
                ticker: "NVDA".to_string(),
                source_period: Period::Minute10,
                target: Period::Minute2,
            })
        );
    }
}
