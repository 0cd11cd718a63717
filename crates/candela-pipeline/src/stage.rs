//! A single aggregation stage.

use candela_aggregate::{Aggregator, Candle, Observation};
use candela_types::Period;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::Sink;

/// How a stage decides that its inbound stream is over.
#[derive(Debug, Clone)]
pub enum Shutdown {
    /// Head of a pipeline. When the token is cancelled the inbound channel
    /// is closed to new events, events already queued are still processed,
    /// then the stage flushes.
    OnCancel(CancellationToken),
    /// Downstream stage. Runs until the upstream stage drops its sender,
    /// which it only does after forwarding its own flush output.
    OnUpstreamClose,
}

/// Counters reported by a stage when it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    /// Period of the stage.
    pub period: Period,
    /// Inbound events received.
    pub received: u64,
    /// Inbound events dropped as malformed.
    pub dropped: u64,
    /// Candles closed by a bucket rollover.
    pub emitted: u64,
    /// Candles closed by the final flush.
    pub flushed: u64,
    /// Sink writes that failed.
    pub sink_failures: u64,
    /// Candles that could not be handed to the next stage.
    pub forward_failures: u64,
}

impl StageReport {
    const fn new(period: Period) -> Self {
        Self {
            period,
            received: 0,
            dropped: 0,
            emitted: 0,
            flushed: 0,
            sink_failures: 0,
            forward_failures: 0,
        }
    }

    /// Total candles produced by the stage.
    #[must_use]
    pub const fn candles(&self) -> u64 {
        self.emitted + self.flushed
    }
}

/// One aggregation stage: an [`Aggregator`] plus its channels and sink.
///
/// The stage owns its aggregator exclusively and processes one event at a
/// time, so no two updates for the same ticker can interleave.
pub struct Stage<I> {
    aggregator: Aggregator,
    inbound: mpsc::Receiver<I>,
    outbound: Option<mpsc::Sender<Candle>>,
    sink: Box<dyn Sink>,
    shutdown: Shutdown,
    draining: bool,
    report: StageReport,
}

impl<I> std::fmt::Debug for Stage<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("aggregator", &self.aggregator)
            .field("chained", &self.outbound.is_some())
            .field("shutdown", &self.shutdown)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl<I: Observation> Stage<I> {
    /// Creates a stage aggregating `inbound` events at `period`.
    ///
    /// The stage has no outbound channel until [`Stage::chain`] is called.
    #[must_use]
    pub fn new(
        period: Period,
        inbound: mpsc::Receiver<I>,
        sink: Box<dyn Sink>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(period),
            inbound,
            outbound: None,
            sink,
            shutdown,
            draining: false,
            report: StageReport::new(period),
        }
    }

    /// Creates the outbound channel and returns the receiving end for the
    /// next stage.
    pub fn chain(&mut self, capacity: usize) -> mpsc::Receiver<Candle> {
        let (tx, rx) = mpsc::channel(capacity);
        self.outbound = Some(tx);
        rx
    }

    /// Returns the stage period.
    #[must_use]
    pub const fn period(&self) -> Period {
        self.aggregator.period()
    }

    /// Spawns the stage on the tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(self) -> JoinHandle<StageReport> {
        let span = info_span!("stage", period = %self.period());
        tokio::spawn(self.run().instrument(span))
    }

    /// Runs the stage until its inbound stream ends, then flushes.
    ///
    /// Every open candle is forwarded before this returns, and the outbound
    /// channel is closed afterwards.
    pub async fn run(mut self) -> StageReport {
        debug!("stage started");
        while let Some(event) = self.next_event().await {
            self.handle(event).await;
        }
        self.finish().await
    }

    async fn next_event(&mut self) -> Option<I> {
        match &self.shutdown {
            Shutdown::OnCancel(token) if !self.draining => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        info!("cancellation observed, draining queued events");
                        self.draining = true;
                        self.inbound.close();
                        self.inbound.recv().await
                    }
                    event = self.inbound.recv() => event,
                }
            }
            _ => self.inbound.recv().await,
        }
    }

    async fn handle(&mut self, event: I) {
        self.report.received += 1;
        match self.aggregator.update(&event) {
            Ok(Some(closed)) => {
                self.report.emitted += 1;
                self.forward(closed).await;
            }
            Ok(None) => {}
            Err(err) => {
                self.report.dropped += 1;
                warn!(ticker = event.ticker(), error = %err, "dropping malformed event");
            }
        }
    }

    async fn forward(&mut self, candle: Candle) {
        debug!(%candle, "candle closed");
        if let Err(err) = self.sink.record(&candle).await {
            self.report.sink_failures += 1;
            warn!(ticker = %candle.ticker, error = %err, "sink write failed");
        }
        if let Some(outbound) = &self.outbound
            && outbound.send(candle).await.is_err()
        {
            self.report.forward_failures += 1;
            error!("next stage is gone, candle not forwarded");
        }
    }

    async fn finish(mut self) -> StageReport {
        let open = self.aggregator.flush_all();
        for candle in open {
            self.report.flushed += 1;
            self.forward(candle).await;
        }
        if let Err(err) = self.sink.close().await {
            self.report.sink_failures += 1;
            warn!(error = %err, "sink close failed");
        }
        // Dropping the sender is the end-of-stream signal for the next stage.
        drop(self.outbound.take());

        let report = self.report;
        info!(
            received = report.received,
            dropped = report.dropped,
            emitted = report.emitted,
            flushed = report.flushed,
            sink_failures = report.sink_failures,
            "stage drained"
        );
        report
    }
}
