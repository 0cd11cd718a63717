//! Periods command implementation.

use anyhow::Result;
use candela_lib::prelude::*;

/// List the supported candle periods and which coarser periods each feeds.
pub(crate) fn list_periods() -> Result<()> {
    println!("{:<8} {:>8} {:<20}", "PERIOD", "SECONDS", "ROLLS UP INTO");
    println!("{}", "-".repeat(40));

    for &period in Period::all() {
        let coarser: Vec<_> = Period::all()
            .iter()
            .filter(|&&other| other > period && period.divides(other))
            .map(Period::as_str)
            .collect();
        println!(
            "{:<8} {:>8} {:<20}",
            period,
            period.seconds(),
            coarser.join(", ")
        );
    }

    let chain: Vec<_> = PipelineConfig::default()
        .periods
        .iter()
        .map(Period::as_str)
        .collect();
    println!("\nDefault chain: {}", chain.join(" -> "));
    Ok(())
}
