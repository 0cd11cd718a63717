//! candela CLI - real-time tick-to-candle aggregation with cascading rollups.

use anyhow::Result;
use candela_lib::OutputFormat;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "candela")]
#[command(about = "Real-time tick-to-candle aggregation with cascading rollups", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (only warnings and errors are logged)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate generated prices into candles until Ctrl-C
    Run {
        /// Tickers to generate prices for (comma-separated)
        #[arg(short, long, value_delimiter = ',', default_value = "AAPL,SBER,NVDA,TSLA")]
        tickers: Vec<String>,

        /// Periods in rollup order (comma-separated)
        #[arg(short, long, value_delimiter = ',', default_value = "1m,2m,10m")]
        periods: Vec<String>,

        /// JSON pipeline configuration file (overrides --periods and --capacity)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory. Files named candles_<period>.<format>
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Output format (csv, tsv, ndjson)
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,

        /// Milliseconds between two rounds of generated prices
        #[arg(long, default_value = "500")]
        delay_ms: u64,

        /// Price scale of the random walk
        #[arg(long, default_value = "10")]
        factor: f64,

        /// Seed for reproducible prices
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(short, long)]
        duration: Option<u64>,

        /// Inter-stage channel capacity
        #[arg(long, default_value = "1024")]
        capacity: usize,
    },

    /// List supported periods
    Periods,

    /// Show the bucket a timestamp falls into
    Bucket {
        /// Period identifier (e.g., 1m, 2m, 10m)
        period: String,

        /// RFC 3339 timestamp. Defaults to now.
        timestamp: Option<String>,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Run {
            tickers,
            periods,
            config,
            output_dir,
            format,
            delay_ms,
            factor,
            seed,
            duration,
            capacity,
        } => {
            commands::run::run(commands::run::RunArgs {
                tickers,
                periods,
                config,
                output_dir,
                format,
                delay_ms,
                factor,
                seed,
                duration,
                capacity,
            })
            .await
        }
        Commands::Periods => commands::periods::list_periods(),
        Commands::Bucket { period, timestamp } => {
            commands::bucket::show_bucket(&period, timestamp.as_deref())
        }
    }
}
