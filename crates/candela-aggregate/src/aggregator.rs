//! Per-ticker streaming candle aggregation.

use std::collections::BTreeMap;

use candela_types::{MalformedInputError, Period, Price};

use crate::{Candle, Observation};

/// Streaming candle aggregator for a single period.
///
/// Keeps at most one open candle per ticker. Each ticker is either without a
/// candle, or has an open candle for bucket `b`:
///
/// - an event for a ticker without a candle opens one;
/// - an event in bucket `b` is merged into the open candle;
/// - an event in a later bucket closes the open candle, which is returned,
///   and opens a new one from the event in the same step;
/// - an event in an earlier bucket is rejected and changes nothing.
///
/// Bucket starts of the candles returned for one ticker are therefore
/// strictly increasing.
#[derive(Debug)]
pub struct Aggregator {
    period: Period,
    table: BTreeMap<String, Candle>,
}

impl Aggregator {
    /// Creates an empty aggregator for the given period.
    #[must_use]
    pub const fn new(period: Period) -> Self {
        Self {
            period,
            table: BTreeMap::new(),
        }
    }

    /// Returns the period being aggregated to.
    #[must_use]
    pub const fn period(&self) -> Period {
        self.period
    }

    /// Returns the number of tickers with an open candle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if no candle is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the open candle for a ticker, if any.
    #[must_use]
    pub fn open_candle(&self, ticker: &str) -> Option<&Candle> {
        self.table.get(ticker)
    }

    /// Processes a raw price, potentially closing a candle.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is malformed or out of order. The
    /// aggregator state is left untouched in that case.
    pub fn update_from_price(
        &mut self,
        price: &Price,
    ) -> Result<Option<Candle>, MalformedInputError> {
        self.update(price)
    }

    /// Processes a closed candle of a finer period, potentially closing a candle.
    ///
    /// # Errors
    ///
    /// Returns an error if the candle is malformed, out of order, or cannot
    /// be rolled up into this aggregator's period.
    pub fn update_from_candle(
        &mut self,
        candle: &Candle,
    ) -> Result<Option<Candle>, MalformedInputError> {
        self.update(candle)
    }

    /// Processes any observation.
    ///
    /// Returns `Some(candle)` when the observation rolls its ticker over into
    /// a new bucket, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the observation is rejected; nothing is mutated.
    pub fn update<O: Observation>(
        &mut self,
        event: &O,
    ) -> Result<Option<Candle>, MalformedInputError> {
        event.validate(self.period)?;
        let bucket = self.period.bucket_start(event.timestamp());

        match self.table.get_mut(event.ticker()) {
            Some(open) if open.bucket_start == bucket => {
                event.merge_into(open);
                Ok(None)
            }
            Some(open) if bucket < open.bucket_start => Err(MalformedInputError::StaleBucket {
                ticker: event.ticker().to_string(),
                bucket,
                open: open.bucket_start,
            }),
            Some(open) => {
                let next = event.open_candle(self.period);
                Ok(Some(std::mem::replace(open, next)))
            }
            None => {
                let candle = event.open_candle(self.period);
                self.table.insert(event.ticker().to_string(), candle);
                Ok(None)
            }
        }
    }

    /// Closes every open candle, returning them in ticker order.
    ///
    /// The aggregator is empty afterwards.
    pub fn flush_all(&mut self) -> Vec<Candle> {
        std::mem::take(&mut self.table).into_values().collect()
    }
}
