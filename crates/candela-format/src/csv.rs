//! CSV output format.

use candela_aggregate::Candle;
use std::io::Write;

use crate::{FormatError, Formatter};

/// CSV formatter.
///
/// Writes one `ticker,bucket_start,open,high,low,close` line per candle.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row (default: no).
    include_header: bool,
    /// Decimal places for prices (default: 6).
    precision: usize,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: false,
            precision: 6,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Sets the number of decimal places written for prices.
    #[must_use]
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self::new().with_delimiter('\t')
    }
}

impl Formatter for CsvFormatter {
    fn write_header<W: Write>(&self, mut writer: W) -> Result<(), FormatError> {
        if self.include_header {
            let d = self.delimiter;
            writeln!(writer, "ticker{d}bucket_start{d}open{d}high{d}low{d}close")?;
        }
        Ok(())
    }

    fn write_candle<W: Write>(&self, candle: &Candle, mut writer: W) -> Result<(), FormatError> {
        let d = self.delimiter;
        let p = self.precision;
        writeln!(
            writer,
            "{}{d}{}{d}{:.p$}{d}{:.p$}{d}{:.p$}{d}{:.p$}",
            candle.ticker,
            candle.bucket_start.format("%Y-%m-%dT%H:%M:%SZ"),
            candle.open,
            candle.high,
            candle.low,
            candle.close,
        )?;
        Ok(())
    }

    fn extension(&self) -> &str {
        if self.delimiter == '\t' { "tsv" } else { "csv" }
    }
}
