//! Pipeline configuration.

use candela_types::{CandelaError, ConfigError, Period};
use serde::{Deserialize, Serialize};

/// Default inter-stage channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Configuration for a rollup pipeline.
///
/// `periods` is the chain order, finest first. Every period must be a
/// strictly coarser whole multiple of the one before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    /// Stage periods in chain order.
    pub periods: Vec<Period>,
    /// Capacity of every bounded inter-stage channel.
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            periods: Period::all().to_vec(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// On-disk form, with periods kept as strings so unknown values surface as
/// [`ConfigError::UnknownPeriod`].
#[derive(Debug, Deserialize)]
struct RawPipelineConfig {
    periods: Option<Vec<String>>,
    channel_capacity: Option<usize>,
}

impl PipelineConfig {
    /// Builds a configuration from period identifiers such as `["1m", "2m", "10m"]`.
    ///
    /// # Errors
    ///
    /// Returns an error if a period is unknown or the chain is invalid.
    pub fn from_period_strs<S: AsRef<str>>(periods: &[S]) -> Result<Self, ConfigError> {
        let periods = periods
            .iter()
            .map(|p| p.as_ref().parse::<Period>())
            .collect::<Result<Vec<_>, _>>()?;
        let config = Self {
            periods,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON configuration, e.g. `{"periods": ["1m", "10m"], "channel_capacity": 64}`.
    ///
    /// Missing fields fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid, a period is unknown, or the
    /// chain is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, CandelaError> {
        let raw: RawPipelineConfig = serde_json::from_str(json)?;
        let mut config = match raw.periods {
            Some(periods) => Self::from_period_strs(&periods)?,
            None => Self::default(),
        };
        if let Some(capacity) = raw.channel_capacity {
            config.channel_capacity = capacity;
        }
        config.validate()?;
        Ok(config)
    }

    /// Sets the inter-stage channel capacity.
    #[must_use]
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Checks the chain before any stage is started.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain is empty, the capacity is zero, or a
    /// period cannot roll up from its predecessor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.periods.is_empty() {
            return Err(ConfigError::EmptyChain);
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        for pair in self.periods.windows(2) {
            let (finer, coarser) = (pair[0], pair[1]);
            if finer >= coarser || !finer.divides(coarser) {
                return Err(ConfigError::NotCoarser { finer, coarser });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_is_valid() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.periods,
            [Period::Minute1, Period::Minute2, Period::Minute10]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_period_strs() {
        let config = PipelineConfig::from_period_strs(&["1m", "10m"]).unwrap();
        assert_eq!(config.periods, [Period::Minute1, Period::Minute10]);

        assert_eq!(
            PipelineConfig::from_period_strs(&["1m", "3m"]),
            Err(ConfigError::UnknownPeriod("3m".to_string()))
        );
    }

    #[test]
    fn test_chain_must_get_coarser() {
        assert_eq!(
            PipelineConfig::from_period_strs(&["2m", "1m"]),
            Err(ConfigError::NotCoarser {
                finer: Period::Minute2,
                coarser: Period::Minute1,
            })
        );
        assert!(matches!(
            PipelineConfig::from_period_strs(&["1m", "1m"]),
            Err(ConfigError::NotCoarser { .. })
        ));
        assert_eq!(
            PipelineConfig::from_period_strs::<&str>(&[]),
            Err(ConfigError::EmptyChain)
        );
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = PipelineConfig::default().with_channel_capacity(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn test_from_json() {
        let config =
            PipelineConfig::from_json_str(r#"{"periods": ["1m", "2m"], "channel_capacity": 8}"#)
                .unwrap();
        assert_eq!(config.periods, [Period::Minute1, Period::Minute2]);
        assert_eq!(config.channel_capacity, 8);

        let defaults = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(defaults, PipelineConfig::default());

        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"periods": ["15m"]}"#),
            Err(CandelaError::Config(ConfigError::UnknownPeriod(_)))
        ));
    }
}
