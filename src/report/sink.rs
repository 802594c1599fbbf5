//! Output ports for regime reports.
//!
//! Analysis never writes files itself; callers hand a finished
//! [`RegimeReport`] to one or more sinks.

use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

use super::summary::RegimeReport;
use crate::regime::MarketType;

pub const BEAR_MARKET_FILE: &str = "bear_market.csv";
pub const BULL_MARKET_FILE: &str = "bull_market.csv";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination for a finished report.
pub trait RegimeSink {
    fn write(&mut self, report: &RegimeReport) -> Result<(), ReportError>;
}

fn ensure_dir(dir: &Path) -> Result<(), ReportError> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Writes `bear_market.csv` and `bull_market.csv` into a directory.
#[derive(Debug, Clone)]
pub struct CsvRegimeSink {
    dir: PathBuf,
}

impl CsvRegimeSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, market_type: MarketType) -> PathBuf {
        match market_type {
            MarketType::Bear => self.dir.join(BEAR_MARKET_FILE),
            MarketType::Bull => self.dir.join(BULL_MARKET_FILE),
        }
    }
}

impl RegimeSink for CsvRegimeSink {
    fn write(&mut self, report: &RegimeReport) -> Result<(), ReportError> {
        ensure_dir(&self.dir)?;

        for market_type in [MarketType::Bear, MarketType::Bull] {
            let mut df = report.table.to_dataframe(market_type)?;
            let path = self.path_for(market_type);

            let mut file = fs::File::create(&path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b',')
                .finish(&mut df)?;

            info!("Wrote {} {} markets to {}", df.height(), market_type, path.display());
        }
        Ok(())
    }
}

/// Writes the timeline and statistics as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonRegimeSink {
    path: PathBuf,
}

impl JsonRegimeSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegimeSink for JsonRegimeSink {
    fn write(&mut self, report: &RegimeReport) -> Result<(), ReportError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&self.path, json)?;
        info!("Wrote regime timeline to {}", self.path.display());
        Ok(())
    }
}

/// Keeps every report it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub reports: Vec<RegimeReport>,
}

impl RegimeSink for MemorySink {
    fn write(&mut self, report: &RegimeReport) -> Result<(), ReportError> {
        self.reports.push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceSeries;
    use crate::regime::{detect, synthesize};
    use chrono::{Duration, NaiveDate};
    use tempfile::tempdir;

    fn sample_report() -> RegimeReport {
        let start = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
        let series = PriceSeries::from_pairs(
            "TEST",
            [100.0, 90.0, 79.0, 85.0, 95.0]
                .iter()
                .enumerate()
                .map(|(i, &p)| (start + Duration::days(7 * i as i64), p)),
        );
        let intervals = detect(&series.prices(), 0.20).unwrap();
        let timeline = synthesize(&series, &intervals).unwrap();
        RegimeReport::new("TEST", 0.20, timeline)
    }

    #[test]
    fn test_csv_sink_writes_both_tables() {
        let dir = tempdir().unwrap();
        let mut sink = CsvRegimeSink::new(dir.path().join("out"));
        sink.write(&sample_report()).unwrap();

        let bear = fs::read_to_string(sink.path_for(MarketType::Bear)).unwrap();
        let mut lines = bear.lines();
        assert_eq!(
            lines.next(),
            Some("Trough Date,Peak Date,Trough Price,Peak Price,Percent Gain,Number Of Days")
        );
        let fields: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(&fields[..2], &["2000-01-17", "2000-01-03"]);
        assert_eq!(fields[2].parse::<f64>().unwrap(), 79.0);
        assert!((fields[4].parse::<f64>().unwrap() + 21.0).abs() < 1e-9);
        assert_eq!(fields[5], "21");
        assert_eq!(lines.next(), None);

        let bull = fs::read_to_string(sink.path_for(MarketType::Bull)).unwrap();
        assert_eq!(bull.lines().count(), 2);
    }

    #[test]
    fn test_json_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timeline.json");
        let mut sink = JsonRegimeSink::new(&path);
        sink.write(&sample_report()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["symbol"], "TEST");
        assert_eq!(value["timeline"]["regimes"].as_array().unwrap().len(), 2);
        assert_eq!(value["bear_stats"]["count"], 1);
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::default();
        let report = sample_report();
        sink.write(&report).unwrap();
        sink.write(&report).unwrap();

        assert_eq!(sink.reports.len(), 2);
        assert_eq!(sink.reports[0].timeline, report.timeline);
    }
}
