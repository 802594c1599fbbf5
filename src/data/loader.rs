//! Price series loader for CSV and Parquet files.
//!
//! Files hold one row per sample with at least two columns:
//! - `Date` as `YYYY-MM-DD` (a trailing time component is ignored)
//! - a price column, `Adj Close` by default
//!
//! Rows with a null price are dropped. Malformed dates are an error.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

use super::types::{PricePoint, PriceSeries};

/// Date column name in loaded and saved files.
pub const DATE_COLUMN: &str = "Date";

/// Default price column, matching common market data exports.
pub const DEFAULT_PRICE_COLUMN: &str = "Adj Close";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    fn from_path(path: &Path) -> Result<Self, LoaderError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            _ => Err(LoaderError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Loader for dated price files.
pub struct SeriesLoader {
    price_column: String,
}

impl Default for SeriesLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_COLUMN)
    }
}

impl SeriesLoader {
    /// Create a loader reading prices from `price_column`.
    pub fn new(price_column: &str) -> Self {
        Self {
            price_column: price_column.to_string(),
        }
    }

    pub fn price_column(&self) -> &str {
        &self.price_column
    }

    /// Scan a price file lazily.
    pub fn load_lazy(&self, path: &Path) -> Result<LazyFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::FileNotFound(path.display().to_string()));
        }

        let lf = match FileFormat::from_path(path)? {
            FileFormat::Csv => LazyCsvReader::new(path).with_has_header(true).finish()?,
            FileFormat::Parquet => LazyFrame::scan_parquet(path, ScanArgsParquet::default())?,
        };
        Ok(lf)
    }

    /// Load the date and price columns as a DataFrame.
    pub fn load_dataframe(&self, path: &Path) -> Result<DataFrame, LoaderError> {
        let df = self
            .load_lazy(path)?
            .select([
                col(DATE_COLUMN),
                col(self.price_column.as_str()).cast(DataType::Float64),
            ])
            .collect()?;
        Ok(df)
    }

    /// Load a price series, sorted by date.
    pub fn load(&self, path: &Path, symbol: &str) -> Result<PriceSeries, LoaderError> {
        let df = self.load_dataframe(path)?;
        let mut points = dataframe_to_points(&df, &self.price_column)?;
        points.sort_by_key(|p| p.date);

        tracing::debug!(
            "Loaded {} samples for {} from {}",
            points.len(),
            symbol,
            path.display()
        );

        Ok(PriceSeries::new(symbol, points))
    }

    /// Write a series as CSV with `Date` and the loader's price column.
    pub fn save_csv(&self, series: &PriceSeries, path: &Path) -> Result<(), LoaderError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let dates: Vec<String> = series
            .points()
            .iter()
            .map(|p| p.date.format(DATE_FORMAT).to_string())
            .collect();
        let prices = series.prices();

        let mut df = DataFrame::new(vec![
            Series::new(DATE_COLUMN.into(), dates).into(),
            Series::new(self.price_column.as_str().into(), prices).into(),
        ])?;

        let mut file = fs::File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        Ok(())
    }
}

/// Convert days since Unix epoch to NaiveDate.
fn date_from_days(days: i32) -> NaiveDate {
    NaiveDate::from_num_days_from_ce_opt(days + 719163).unwrap_or_default()
}

/// Parse a date cell, accepting `YYYY-MM-DD` optionally followed by a time.
fn parse_date_cell(raw: &str) -> Result<NaiveDate, LoaderError> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map_err(|e| LoaderError::InvalidData(format!("Invalid date '{}': {}", raw, e)))
}

/// Pair the date column with the price column, dropping null prices.
fn dataframe_to_points(df: &DataFrame, price_column: &str) -> Result<Vec<PricePoint>, LoaderError> {
    let dates_col = df.column(DATE_COLUMN)?;

    // Handle both string and date column types
    let dates: Vec<Option<NaiveDate>> = if let Ok(str_col) = dates_col.str() {
        str_col
            .into_iter()
            .map(|s| s.map(parse_date_cell).transpose())
            .collect::<Result<_, _>>()?
    } else if let Ok(date_col) = dates_col.date() {
        date_col
            .into_iter()
            .map(|d| d.map(date_from_days))
            .collect()
    } else {
        return Err(LoaderError::InvalidData(format!(
            "{} column has unexpected type {}",
            DATE_COLUMN,
            dates_col.dtype()
        )));
    };

    let prices = df.column(price_column)?.f64()?;

    let mut points = Vec::with_capacity(dates.len());
    for (idx, (date, price)) in dates.into_iter().zip(prices.into_iter()).enumerate() {
        let Some(price) = price else {
            continue;
        };
        let date = date.ok_or_else(|| {
            LoaderError::InvalidData(format!("Missing date at row {}", idx))
        })?;
        points.push(PricePoint::new(date, price));
    }

    Ok(points)
}
