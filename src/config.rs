//! Analysis configuration.
//!
//! Loaded from TOML; every field has a default so a partial file (or no file)
//! is valid. Command-line flags override file values.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{DEFAULT_PRICE_COLUMN, WEEKLY_CADENCE_DAYS};
use crate::validation::DEFAULT_MAX_GAP_DAYS;

/// Default fractional threshold for entering and leaving a bear market.
pub const DEFAULT_RECOVERY_LIMIT: f64 = 0.20;

/// Default ticker (S&P 500 index).
pub const DEFAULT_TICKER: &str = "^GSPC";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Parameters of one regime analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Symbol to analyze.
    pub ticker: String,

    /// Drawdown that starts a bear market and rebound that ends it (0.20 = 20%).
    pub recovery_limit: f64,

    /// First date of the analysis window (inclusive).
    pub start_date: NaiveDate,

    /// Last date of the analysis window (inclusive).
    pub end_date: NaiveDate,

    /// Resampling cadence in calendar days; 0 keeps the raw series.
    pub cadence_days: u32,

    /// Price column read from input files.
    pub price_column: String,

    /// Gaps longer than this are reported by the integrity checks.
    pub max_gap_days: i64,

    /// Directory for the CSV regime tables.
    pub output_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            recovery_limit: DEFAULT_RECOVERY_LIMIT,
            start_date: NaiveDate::from_ymd_opt(1927, 12, 29).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2023, 12, 6).unwrap_or_default(),
            cadence_days: WEEKLY_CADENCE_DAYS,
            price_column: DEFAULT_PRICE_COLUMN.to_string(),
            max_gap_days: DEFAULT_MAX_GAP_DAYS,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AnalysisConfig {
    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticker.trim().is_empty() {
            return Err(ConfigError::Invalid("ticker must not be empty".to_string()));
        }
        if !(self.recovery_limit > 0.0 && self.recovery_limit < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "recovery_limit must be in (0, 1), got {}",
                self.recovery_limit
            )));
        }
        if self.start_date > self.end_date {
            return Err(ConfigError::Invalid(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.price_column.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "price_column must not be empty".to_string(),
            ));
        }
        if self.max_gap_days < 1 {
            return Err(ConfigError::Invalid(format!(
                "max_gap_days must be positive, got {}",
                self.max_gap_days
            )));
        }
        Ok(())
    }
}
