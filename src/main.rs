//! Market cycle analysis CLI
//!
//! Splits a price history into alternating bear and bull markets.
//!
//! # Usage
//!
//! ```bash
//! # Analyze the S&P 500 with the defaults (20% threshold, weekly samples)
//! market-cycles analyze
//!
//! # Analyze a local file with a config and a JSON timeline
//! market-cycles analyze --config config/default.toml --input data/spx.csv --json out/timeline.json
//!
//! # Save a price history for offline runs
//! market-cycles download --ticker ^GSPC --output data/spx.csv
//!
//! # Pick a smoothing window for local extrema
//! market-cycles extrema --input data/spx.csv --min-window 2 --max-window 60
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use polars::prelude::*;
use tracing::info;

use market_cycles::config::AnalysisConfig;
use market_cycles::data::{PriceSource, SeriesLoader};
use market_cycles::extrema::{extrema_to_dataframe, find_local_extrema, find_optimal_window_size};
use market_cycles::pipeline::RegimeAnalyzer;
use market_cycles::report::{CsvRegimeSink, JsonRegimeSink, RegimeSink};

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "market-cycles")]
#[command(about = "Bear and bull market detection over historical prices")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the prices come from and which window to use.
#[derive(clap::Args)]
struct SourceArgs {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ticker symbol [default: ^GSPC]
    #[arg(long)]
    ticker: Option<String>,

    /// Start date, YYYY-MM-DD [default: 1927-12-29]
    #[arg(long)]
    start: Option<String>,

    /// End date, YYYY-MM-DD [default: 2023-12-06]
    #[arg(long)]
    end: Option<String>,

    /// Read prices from a CSV or Parquet file instead of Yahoo Finance
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Resampling cadence in days, 0 to keep raw samples [default: 7]
    #[arg(long)]
    cadence_days: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect bear and bull markets and write the regime tables
    Analyze {
        #[command(flatten)]
        source: SourceArgs,

        /// Fractional drawdown/rebound threshold [default: 0.20]
        #[arg(short, long)]
        recovery_limit: Option<f64>,

        /// Output directory for bear_market.csv and bull_market.csv [default: .]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the timeline and statistics as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Download a price history and save it as CSV
    Download {
        /// Ticker symbol
        #[arg(long, default_value = "^GSPC")]
        ticker: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long, default_value = "1927-12-29")]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long, default_value = "2023-12-06")]
        end: String,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Find the smoothing window for local extrema
    Extrema {
        #[command(flatten)]
        source: SourceArgs,

        /// Smallest window to try
        #[arg(long, default_value_t = 2)]
        min_window: usize,

        /// Largest window to try
        #[arg(long, default_value_t = 60)]
        max_window: usize,

        /// Write the local extrema for the chosen window as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_date(raw: &str, what: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format: {}", what, raw))
}

impl SourceArgs {
    /// File config (or defaults) overridden by command-line flags.
    fn resolve(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };

        if let Some(ticker) = &self.ticker {
            config.ticker = ticker.clone();
        }
        if let Some(start) = &self.start {
            config.start_date = parse_date(start, "start")?;
        }
        if let Some(end) = &self.end {
            config.end_date = parse_date(end, "end")?;
        }
        if let Some(cadence_days) = self.cadence_days {
            config.cadence_days = cadence_days;
        }
        Ok(config)
    }

    fn price_source(&self, config: &AnalysisConfig) -> PriceSource {
        match &self.input {
            Some(path) => PriceSource::file(path, &config.price_column),
            None => PriceSource::yahoo(),
        }
    }
}

async fn cmd_analyze(
    source: SourceArgs,
    recovery_limit: Option<f64>,
    output: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    let mut config = source.resolve()?;
    if let Some(recovery_limit) = recovery_limit {
        config.recovery_limit = recovery_limit;
    }
    if let Some(output) = output {
        config.output_dir = output;
    }
    config.validate().context("Invalid analysis settings")?;

    let price_source = source.price_source(&config);
    let analyzer = RegimeAnalyzer::new(config.clone())?;
    let report = analyzer
        .run(&price_source)
        .await
        .with_context(|| format!("Analysis of {} failed", config.ticker))?;

    let mut csv = CsvRegimeSink::new(&config.output_dir);
    let mut sinks: Vec<&mut dyn RegimeSink> = vec![&mut csv];
    let mut json_sink = json.map(JsonRegimeSink::new);
    if let Some(sink) = json_sink.as_mut() {
        sinks.push(sink);
    }
    analyzer
        .publish(&report, &mut sinks)
        .context("Failed to write regime report")?;

    println!("\n{}", SEPARATOR);
    println!("{}", report.summary());
    println!("{}", SEPARATOR);
    Ok(())
}

async fn cmd_download(ticker: &str, start: &str, end: &str, output: &Path) -> Result<()> {
    let start_date = parse_date(start, "start")?;
    let end_date = parse_date(end, "end")?;

    let series = PriceSource::yahoo()
        .fetch(ticker, start_date, end_date)
        .await
        .with_context(|| format!("Failed to download {}", ticker))?;

    SeriesLoader::default()
        .save_csv(&series, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Saved {} samples of {} to {}", series.len(), ticker, output.display());
    Ok(())
}

async fn cmd_extrema(
    source: SourceArgs,
    min_window: usize,
    max_window: usize,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = source.resolve()?;
    config.validate().context("Invalid analysis settings")?;

    let analyzer = RegimeAnalyzer::new(config.clone())?;
    let raw = source
        .price_source(&config)
        .fetch(&config.ticker, config.start_date, config.end_date)
        .await
        .with_context(|| format!("Failed to fetch {}", config.ticker))?;
    let series = analyzer.prepare(&raw)?;

    let selection = find_optimal_window_size(&series, min_window, max_window)?;

    println!("\n{}", SEPARATOR);
    println!("Window Search: {}", series.symbol);
    println!("{}", SEPARATOR);
    for score in &selection.scores {
        match score.total_variance {
            Some(total) => println!(
                "  window {:>4}: {:>4} maxima, {:>4} minima, total variance {:.4}",
                score.window, score.maxima, score.minima, total
            ),
            None => println!(
                "  window {:>4}: {:>4} maxima, {:>4} minima, total variance n/a",
                score.window, score.maxima, score.minima
            ),
        }
    }
    println!("\nOptimal window: {}", selection.window);

    if let Some(path) = output {
        let extrema = find_local_extrema(&series, selection.window)?;
        let mut df = extrema_to_dataframe(&extrema)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        info!("Wrote {} local extrema to {}", extrema.len(), path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("market_cycles=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            recovery_limit,
            output,
            json,
        } => cmd_analyze(source, recovery_limit, output, json).await?,
        Commands::Download {
            ticker,
            start,
            end,
            output,
        } => cmd_download(&ticker, &start, &end, &output).await?,
        Commands::Extrema {
            source,
            min_window,
            max_window,
            output,
        } => cmd_extrema(source, min_window, max_window, output).await?,
    }

    Ok(())
}
