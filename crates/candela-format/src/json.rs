//! Newline-delimited JSON output format.

use candela_aggregate::Candle;
use std::io::Write;

use crate::{FormatError, Formatter};

/// NDJSON formatter, one JSON object per candle.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Creates a new NDJSON formatter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Formatter for JsonFormatter {
    fn write_header<W: Write>(&self, _writer: W) -> Result<(), FormatError> {
        Ok(())
    }

    fn write_candle<W: Write>(&self, candle: &Candle, mut writer: W) -> Result<(), FormatError> {
        serde_json::to_writer(&mut writer, candle)?;
        writeln!(writer)?;
        Ok(())
    }

    fn extension(&self) -> &str {
        "ndjson"
    }
}
