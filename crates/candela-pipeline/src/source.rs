//! Random-walk price source.

use std::time::Duration;

use candela_types::{ConfigError, Price};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Configuration for [`PriceGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Tickers to generate prices for.
    pub tickers: Vec<String>,
    /// Scale of the starting prices and of each random step.
    pub factor: f64,
    /// Pause between two rounds of prices.
    pub delay: Duration,
    /// Seed for reproducible output; random when `None`.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tickers: ["AAPL", "SBER", "NVDA", "TSLA"]
                .into_iter()
                .map(String::from)
                .collect(),
            factor: 10.0,
            delay: Duration::from_millis(500),
            seed: None,
        }
    }
}

/// Emits one price per ticker every `delay`, each following a random walk.
#[derive(Debug)]
pub struct PriceGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    last: Vec<f64>,
}

impl PriceGenerator {
    /// Creates a generator; starting prices are drawn from `[1, 100) * factor`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFactor`] unless `factor` is positive and
    /// finite.
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        if !config.factor.is_finite() || config.factor <= 0.0 {
            return Err(ConfigError::InvalidFactor(config.factor));
        }
        let mut rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let last = config
            .tickers
            .iter()
            .map(|_| rng.gen_range(1.0..100.0) * config.factor)
            .collect();
        Ok(Self { config, rng, last })
    }

    /// Produces the next round of prices, all stamped with `now`.
    ///
    /// Each step moves a ticker by at most `factor / 10` and never below
    /// one hundredth of `factor`.
    pub fn next_round(&mut self, now: DateTime<Utc>) -> Vec<Price> {
        let step = self.config.factor / 10.0;
        let floor = self.config.factor / 100.0;
        self.config
            .tickers
            .iter()
            .zip(self.last.iter_mut())
            .map(|(ticker, last)| {
                *last = (*last + self.rng.gen_range(-step..=step)).max(floor);
                Price::new(ticker.clone(), *last, now)
            })
            .collect()
    }

    /// Sends prices into `tx` until `cancel` fires or the receiver is gone.
    ///
    /// Returns the number of prices sent. Dropping the sender on return is
    /// the end-of-stream signal for the pipeline.
    pub async fn run(mut self, tx: mpsc::Sender<Price>, cancel: CancellationToken) -> u64 {
        let mut interval = tokio::time::interval(self.config.delay.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sent = 0;

        info!(tickers = ?self.config.tickers, "price generator started");
        'outer: loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            for price in self.next_round(Utc::now()) {
                debug!(%price, "generated");
                if tx.send(price).await.is_err() {
                    break 'outer;
                }
                sent += 1;
            }
        }
        info!(sent, "price generator stopped");
        sent
    }
}
