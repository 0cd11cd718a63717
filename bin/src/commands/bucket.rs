//! Bucket command implementation.

use anyhow::{Context, Result, bail};
use candela_lib::prelude::*;
use chrono::{DateTime, SecondsFormat, Utc};

/// Print the bucket that `timestamp` (or now) falls into for `period`.
pub(crate) fn show_bucket(period: &str, timestamp: Option<&str>) -> Result<()> {
    let period: Period = period.parse()?;
    let timestamp = match timestamp {
        Some(ts) => DateTime::parse_from_rfc3339(ts)
            .with_context(|| format!("Invalid RFC 3339 timestamp: {ts}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let start = period.bucket_start(timestamp);
    let Some(end) = period.bucket_end(timestamp) else {
        bail!("Bucket of {timestamp} at {period} ends past the supported range");
    };

    println!("Period:    {period}");
    println!(
        "Timestamp: {}",
        timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    );
    println!(
        "Bucket:    [{}, {})",
        start.to_rfc3339_opts(SecondsFormat::Secs, true),
        end.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    Ok(())
}
