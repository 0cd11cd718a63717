//! Candle sinks.
//!
//! A sink is the durable recorder behind a stage. Sink failures are reported
//! to the stage, which logs them and keeps going.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use candela_aggregate::Candle;
use candela_format::{FormatError, Formatter};
use candela_types::Period;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;

/// Errors raised by sinks.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Failed to create the output file.
    #[error("Failed to create '{path}': {source}")]
    Create {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write to the output file.
    #[error("Failed to write '{path}': {source}")]
    Write {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to format a record.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The receiving side is gone.
    #[error("Sink is closed")]
    Closed,
}

/// Recorder of closed candles for one period.
#[async_trait]
pub trait Sink: Send {
    /// Records a closed candle.
    ///
    /// # Errors
    ///
    /// Returns an error if the candle could not be recorded.
    async fn record(&mut self, candle: &Candle) -> Result<(), SinkError>;

    /// Flushes buffered records. Called once, after the stage's final flush.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered records could not be written.
    async fn close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink writing one formatted record per candle to a file.
#[derive(Debug)]
pub struct FileSink<F> {
    path: PathBuf,
    formatter: F,
    writer: BufWriter<File>,
    buf: Vec<u8>,
}

impl<F: Formatter> FileSink<F> {
    /// Creates (or truncates) `path` and writes the formatter's header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the header written.
    pub async fn create(path: impl Into<PathBuf>, formatter: F) -> Result<Self, SinkError> {
        let path = path.into();
        let file = File::create(&path)
            .await
            .map_err(|source| SinkError::Create {
                path: path.clone(),
                source,
            })?;

        let mut sink = Self {
            path,
            formatter,
            writer: BufWriter::new(file),
            buf: Vec::new(),
        };
        sink.formatter.write_header(&mut sink.buf)?;
        sink.write_buf().await?;
        Ok(sink)
    }

    /// Creates `candles_<period>.<ext>` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub async fn for_period(dir: &Path, period: Period, formatter: F) -> Result<Self, SinkError> {
        let path = dir.join(format!("candles_{period}.{}", formatter.extension()));
        Self::create(path, formatter).await
    }

    /// Returns the output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_buf(&mut self) -> Result<(), SinkError> {
        self.writer
            .write_all(&self.buf)
            .await
            .map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.buf.clear();
        Ok(())
    }
}

#[async_trait]
impl<F: Formatter> Sink for FileSink<F> {
    async fn record(&mut self, candle: &Candle) -> Result<(), SinkError> {
        self.buf.clear();
        self.formatter.write_candle(candle, &mut self.buf)?;
        self.write_buf().await
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.writer
            .flush()
            .await
            .map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

/// Sink forwarding candles to an in-process consumer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Candle>,
}

impl ChannelSink {
    /// Creates a sink and the receiver its candles are delivered to.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Candle>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Sink for ChannelSink {
    async fn record(&mut self, candle: &Candle) -> Result<(), SinkError> {
        self.tx.send(candle.clone()).map_err(|_| SinkError::Closed)
    }
}
