//! Rollup pipeline orchestration.

use candela_types::{CandelaError, ConfigError, Period, Price};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{PipelineConfig, Shutdown, Sink, Stage, StageReport};

/// Builds and starts rollup pipelines.
///
/// The first stage aggregates raw prices; every later stage aggregates the
/// closed candles of the stage before it:
///
/// ```text
/// prices -> Stage(1m) -> Stage(2m) -> Stage(10m)
///              |            |             |
///           Sink(1m)     Sink(2m)      Sink(10m)
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Pipeline;

impl Pipeline {
    /// Validates `config` and spawns one task per stage.
    ///
    /// `sinks` are matched to `config.periods` by position. Cancelling
    /// `cancel` stops the head stage from accepting new prices; the flush
    /// then cascades down the chain, one stage after another.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] before anything is spawned if the
    /// configuration is invalid or the sink count does not match.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(
        config: &PipelineConfig,
        prices: mpsc::Receiver<Price>,
        sinks: Vec<Box<dyn Sink>>,
        cancel: CancellationToken,
    ) -> Result<PipelineHandle, ConfigError> {
        config.validate()?;
        if sinks.len() != config.periods.len() {
            return Err(ConfigError::SinkCountMismatch {
                periods: config.periods.len(),
                sinks: sinks.len(),
            });
        }

        let capacity = config.channel_capacity;
        let mut stages = config.periods.iter().copied().zip(sinks).peekable();
        let Some((head_period, head_sink)) = stages.next() else {
            return Err(ConfigError::EmptyChain);
        };

        let mut head = Stage::new(head_period, prices, head_sink, Shutdown::OnCancel(cancel));
        let mut upstream = stages.peek().is_some().then(|| head.chain(capacity));
        let mut tasks = vec![(head_period, head.spawn())];

        while let Some((period, sink)) = stages.next() {
            let Some(inbound) = upstream.take() else {
                break;
            };
            let mut stage = Stage::new(period, inbound, sink, Shutdown::OnUpstreamClose);
            if stages.peek().is_some() {
                upstream = Some(stage.chain(capacity));
            }
            tasks.push((period, stage.spawn()));
        }

        info!(
            periods = ?config.periods,
            capacity,
            "pipeline started"
        );
        Ok(PipelineHandle { tasks })
    }

    /// Spawns a pipeline and waits until it is fully drained.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a stage task fails.
    pub async fn run(
        config: &PipelineConfig,
        prices: mpsc::Receiver<Price>,
        sinks: Vec<Box<dyn Sink>>,
        cancel: CancellationToken,
    ) -> Result<Vec<StageReport>, CandelaError> {
        Self::spawn(config, prices, sinks, cancel)?.join().await
    }
}

/// Handle to a running pipeline.
#[derive(Debug)]
pub struct PipelineHandle {
    tasks: Vec<(Period, JoinHandle<StageReport>)>,
}

impl PipelineHandle {
    /// Returns the stage periods in chain order.
    #[must_use]
    pub fn periods(&self) -> Vec<Period> {
        self.tasks.iter().map(|(period, _)| *period).collect()
    }

    /// Waits for every stage, in chain order, and returns their reports.
    ///
    /// Every stage task has finished when this returns, whether or not one
    /// of them failed. A failed stage drops its outbound sender, so the
    /// stages after it still flush what they hold.
    ///
    /// # Errors
    ///
    /// Returns [`CandelaError::StageTask`] for the first stage task that
    /// panicked or was aborted.
    pub async fn join(self) -> Result<Vec<StageReport>, CandelaError> {
        let mut reports = Vec::with_capacity(self.tasks.len());
        let mut failure = None;
        for (period, handle) in self.tasks {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(%period, error = %e, "stage task failed");
                    failure.get_or_insert(CandelaError::StageTask {
                        period,
                        reason: e.to_string(),
                    });
                }
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }
        info!("pipeline drained");
        Ok(reports)
    }
}
