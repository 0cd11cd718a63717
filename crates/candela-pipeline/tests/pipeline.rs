//! End-to-end tests for the rollup pipeline.

use async_trait::async_trait;
use candela_aggregate::{Aggregator, Candle};
use candela_pipeline::{ChannelSink, Pipeline, PipelineConfig, Sink, SinkError};
use candela_types::{CandelaError, ConfigError, Period, Price};
use chrono::DateTime;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn tick(ticker: &str, seconds: i64, value: f64) -> Price {
    Price::new(ticker, value, DateTime::from_timestamp(seconds, 0).unwrap())
}

/// Prices every 20 seconds for three tickers over `minutes` minutes.
fn market(minutes: i64) -> Vec<Price> {
    (0..minutes * 3)
        .flat_map(|i| {
            let swing = ((i * 13) % 17) as f64 - 8.0;
            [
                tick("AAPL", i * 20, 180.0 + swing),
                tick("NVDA", i * 20 + 1, 480.0 - swing),
                tick("SBER", i * 20 + 2, 250.0 + swing / 2.0),
            ]
        })
        .collect()
}

fn channel_sinks(
    count: usize,
) -> (
    Vec<Box<dyn Sink>>,
    Vec<mpsc::UnboundedReceiver<Candle>>,
) {
    (0..count)
        .map(|_| {
            let (sink, rx) = ChannelSink::channel();
            (Box::new(sink) as Box<dyn Sink>, rx)
        })
        .unzip()
}

fn collect(rx: &mut mpsc::UnboundedReceiver<Candle>) -> Vec<Candle> {
    let mut out = Vec::new();
    while let Ok(candle) = rx.try_recv() {
        out.push(candle);
    }
    out
}

fn sorted(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by(|a, b| {
        a.ticker
            .cmp(&b.ticker)
            .then(a.bucket_start.cmp(&b.bucket_start))
    });
    candles
}

fn aggregate_directly(period: Period, prices: &[Price]) -> Vec<Candle> {
    let mut agg = Aggregator::new(period);
    let mut out: Vec<Candle> = prices
        .iter()
        .filter_map(|p| agg.update_from_price(p).unwrap())
        .collect();
    out.extend(agg.flush_all());
    out
}

struct FailingSink;

#[async_trait]
impl Sink for FailingSink {
    async fn record(&mut self, _candle: &Candle) -> Result<(), SinkError> {
        Err(SinkError::Closed)
    }
}

/// Panics when the stage closes it, after its candles were already forwarded.
struct PanicOnCloseSink;

#[async_trait]
impl Sink for PanicOnCloseSink {
    async fn record(&mut self, _candle: &Candle) -> Result<(), SinkError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        panic!("sink bug");
    }
}

/// Records candles into a channel after a delay.
struct SlowSink {
    tx: mpsc::UnboundedSender<Candle>,
}

#[async_trait]
impl Sink for SlowSink {
    async fn record(&mut self, candle: &Candle) -> Result<(), SinkError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.tx.send(candle.clone()).map_err(|_| SinkError::Closed)
    }
}

#[tokio::test]
async fn test_single_ticker_scenario_reaches_every_period() {
    let config = PipelineConfig::default();
    let (sinks, mut outputs) = channel_sinks(3);
    let (tx, rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let handle = Pipeline::spawn(&config, rx, sinks, cancel.clone()).unwrap();

    tx.send(tick("AAPL", 0, 10.0)).await.unwrap();
    tx.send(tick("AAPL", 30, 12.0)).await.unwrap();
    tx.send(tick("AAPL", 65, 9.0)).await.unwrap();
    cancel.cancel();

    let reports = handle.join().await.unwrap();
    assert_eq!(reports.len(), 3);

    let minute = collect(&mut outputs[0]);
    assert_eq!(minute.len(), 2);
    assert_eq!(minute[0].bucket_start, DateTime::from_timestamp(0, 0).unwrap());
    assert_eq!(
        (minute[0].open, minute[0].high, minute[0].low, minute[0].close),
        (10.0, 12.0, 10.0, 12.0)
    );
    assert_eq!(minute[1].bucket_start, DateTime::from_timestamp(60, 0).unwrap());
    assert_eq!(
        (minute[1].open, minute[1].high, minute[1].low, minute[1].close),
        (9.0, 9.0, 9.0, 9.0)
    );
    assert_eq!((reports[0].emitted, reports[0].flushed), (1, 1));

    for (output, period) in outputs[1..].iter_mut().zip([Period::Minute2, Period::Minute10]) {
        let candles = collect(output);
        assert_eq!(candles.len(), 1, "{period} should flush exactly one candle");
        let candle = &candles[0];
        assert_eq!(candle.period, period);
        assert_eq!(candle.bucket_start, DateTime::from_timestamp(0, 0).unwrap());
        assert_eq!(
            (candle.open, candle.high, candle.low, candle.close),
            (10.0, 12.0, 9.0, 9.0)
        );
        assert_eq!(candle.tick_count, 3);
    }
}

#[tokio::test]
async fn test_cascade_is_lossless_and_matches_direct_aggregation() {
    let prices = market(37);
    let config = PipelineConfig::default().with_channel_capacity(4);
    let (sinks, mut outputs) = channel_sinks(3);
    let (tx, rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let handle = Pipeline::spawn(&config, rx, sinks, cancel.clone()).unwrap();

    for price in prices.iter().cloned() {
        tx.send(price).await.unwrap();
    }
    cancel.cancel();
    let reports = handle.join().await.unwrap();

    for ((output, period), report) in outputs
        .iter_mut()
        .zip(config.periods.iter().copied())
        .zip(&reports)
    {
        let candles = collect(output);
        assert_eq!(report.period, period);
        assert_eq!(report.candles() as usize, candles.len());
        assert_eq!(report.dropped, 0);

        let counted: u64 = candles.iter().map(|c| c.tick_count).sum();
        assert_eq!(counted as usize, prices.len(), "{period} lost ticks");

        for ticker in ["AAPL", "NVDA", "SBER"] {
            let starts: Vec<_> = candles
                .iter()
                .filter(|c| c.ticker == ticker)
                .map(|c| c.bucket_start)
                .collect();
            assert!(starts.windows(2).all(|w| w[0] < w[1]));
        }
        assert!(candles.iter().all(|c| c.low <= c.open.min(c.close)));
        assert!(candles.iter().all(|c| c.open.max(c.close) <= c.high));

        assert_eq!(sorted(candles), sorted(aggregate_directly(period, &prices)));
    }

    assert_eq!(reports[1].received, reports[0].candles());
    assert_eq!(reports[2].received, reports[1].candles());
}

#[tokio::test]
async fn test_source_end_drains_without_cancel() {
    let config = PipelineConfig::from_period_strs(&["1m", "10m"]).unwrap();
    let (sinks, mut outputs) = channel_sinks(2);
    let (tx, rx) = mpsc::channel(64);
    let handle = Pipeline::spawn(&config, rx, sinks, CancellationToken::new()).unwrap();

    for price in market(12) {
        tx.send(price).await.unwrap();
    }
    drop(tx);
    handle.join().await.unwrap();

    let ten = collect(&mut outputs[1]);
    assert_eq!(ten.len(), 6);
    assert!(ten.iter().all(|c| c.period == Period::Minute10));
}

#[tokio::test]
async fn test_sink_failure_does_not_block_forwarding() {
    let config = PipelineConfig::from_period_strs(&["1m", "2m"]).unwrap();
    let (sink, mut two) = ChannelSink::channel();
    let sinks: Vec<Box<dyn Sink>> = vec![Box::new(FailingSink), Box::new(sink)];
    let (tx, rx) = mpsc::channel(64);
    let handle = Pipeline::spawn(&config, rx, sinks, CancellationToken::new()).unwrap();

    let prices = market(6);
    for price in prices.iter().cloned() {
        tx.send(price).await.unwrap();
    }
    drop(tx);
    let reports = handle.join().await.unwrap();

    assert_eq!(reports[0].sink_failures, reports[0].candles());
    assert_eq!(reports[0].forward_failures, 0);
    assert_eq!(reports[1].sink_failures, 0);

    let candles = collect(&mut two);
    assert_eq!(
        sorted(candles),
        sorted(aggregate_directly(Period::Minute2, &prices))
    );
}

#[tokio::test]
async fn test_malformed_prices_are_dropped() {
    let config = PipelineConfig::from_period_strs(&["1m"]).unwrap();
    let (sinks, mut outputs) = channel_sinks(1);
    let (tx, rx) = mpsc::channel(16);
    let handle = Pipeline::spawn(&config, rx, sinks, CancellationToken::new()).unwrap();

    tx.send(tick("TSLA", 90, 200.0)).await.unwrap();
    tx.send(tick("TSLA", 95, f64::NAN)).await.unwrap();
    tx.send(tick("", 96, 1.0)).await.unwrap();
    tx.send(tick("TSLA", 10, 150.0)).await.unwrap();
    tx.send(tick("TSLA", 100, 210.0)).await.unwrap();
    drop(tx);
    let reports = handle.join().await.unwrap();

    assert_eq!(reports[0].received, 5);
    assert_eq!(reports[0].dropped, 3);

    let candles = collect(&mut outputs[0]);
    assert_eq!(candles.len(), 1);
    assert_eq!((candles[0].low, candles[0].high), (200.0, 210.0));
}

#[tokio::test]
async fn test_invalid_configuration_fails_before_start() {
    let (_tx, rx) = mpsc::channel(1);
    let (sinks, _outputs) = channel_sinks(2);
    let result = Pipeline::spawn(
        &PipelineConfig::default(),
        rx,
        sinks,
        CancellationToken::new(),
    );
    assert_eq!(
        result.unwrap_err(),
        ConfigError::SinkCountMismatch {
            periods: 3,
            sinks: 2,
        }
    );

    let (_tx, rx) = mpsc::channel(1);
    let (sinks, _outputs) = channel_sinks(2);
    let config = PipelineConfig {
        periods: vec![Period::Minute10, Period::Minute2],
        ..PipelineConfig::default()
    };
    let result = Pipeline::run(&config, rx, sinks, CancellationToken::new()).await;
    assert!(matches!(
        result,
        Err(CandelaError::Config(ConfigError::NotCoarser { .. }))
    ));
}

#[tokio::test]
async fn test_failed_stage_still_lets_downstream_drain_before_join_returns() {
    let config = PipelineConfig::from_period_strs(&["1m", "2m"]).unwrap();
    let (tx_two, mut two) = mpsc::unbounded_channel();
    let sinks: Vec<Box<dyn Sink>> = vec![
        Box::new(PanicOnCloseSink),
        Box::new(SlowSink { tx: tx_two }),
    ];
    let (tx, rx) = mpsc::channel(16);
    let handle = Pipeline::spawn(&config, rx, sinks, CancellationToken::new()).unwrap();

    tx.send(tick("AAPL", 0, 10.0)).await.unwrap();
    tx.send(tick("AAPL", 65, 9.0)).await.unwrap();
    drop(tx);

    let result = handle.join().await;
    assert!(matches!(
        result,
        Err(CandelaError::StageTask {
            period: Period::Minute1,
            ..
        })
    ));

    let candle = two.try_recv().expect("2m flush recorded before join returned");
    assert_eq!(candle.period, Period::Minute2);
    assert_eq!((candle.open, candle.close, candle.tick_count), (10.0, 9.0, 2));
}

#[test]
#[should_panic]
fn test_spawn_outside_runtime_panics() {
    let (_tx, rx) = mpsc::channel(1);
    let (sinks, _outputs) = channel_sinks(1);
    let config = PipelineConfig::from_period_strs(&["1m"]).unwrap();
    let _handle = Pipeline::spawn(&config, rx, sinks, CancellationToken::new());
}
