//! Price series providers.
//!
//! A provider returns the dated prices of one symbol over a date range.
//! Everything it hands back is checked for emptiness here; ordering and
//! price validity are checked by [`crate::validation`] before analysis.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use super::loader::{LoaderError, SeriesLoader};
use super::types::PriceSeries;
use super::yahoo::{YahooClient, YahooError};

/// Failures of the data acquisition stage.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    #[error("Yahoo Finance error: {0}")]
    Yahoo(#[from] YahooError),

    #[error("No data available for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Integrity check failed: {0}")]
    Integrity(String),
}

/// Where price history comes from.
pub enum PriceSource {
    /// CSV or Parquet file on disk.
    File { path: PathBuf, price_column: String },
    /// Yahoo Finance chart API.
    Yahoo(YahooClient),
}

impl PriceSource {
    pub fn file(path: impl Into<PathBuf>, price_column: &str) -> Self {
        Self::File {
            path: path.into(),
            price_column: price_column.to_string(),
        }
    }

    pub fn yahoo() -> Self {
        Self::Yahoo(YahooClient::new())
    }

    /// Human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::File { path, .. } => format!("file {}", path.display()),
            Self::Yahoo(_) => "Yahoo Finance".to_string(),
        }
    }

    /// Fetch `symbol` between `start` and `end`, both inclusive.
    pub async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, UpstreamError> {
        let series = match self {
            Self::File { path, price_column } => {
                let loader = SeriesLoader::new(price_column);
                loader.load(path, symbol)?.slice_dates(start, end)
            }
            Self::Yahoo(client) => {
                let points = client.fetch_adjusted_close(symbol, start, end).await?;
                PriceSeries::new(symbol, points)
            }
        };

        if series.is_empty() {
            return Err(UpstreamError::NoData {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }

        Ok(series)
    }
}
