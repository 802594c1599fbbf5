//! Tabular regime report.
//!
//! One row per regime, split by regime type and ordered by trough date.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::regime::{MarketType, Regime, Timeline};

pub const TROUGH_DATE: &str = "Trough Date";
pub const PEAK_DATE: &str = "Peak Date";
pub const TROUGH_PRICE: &str = "Trough Price";
pub const PEAK_PRICE: &str = "Peak Price";
pub const PERCENT_GAIN: &str = "Percent Gain";
pub const NUMBER_OF_DAYS: &str = "Number Of Days";

/// Report columns, in output order.
pub const COLUMNS: [&str; 6] = [
    TROUGH_DATE,
    PEAK_DATE,
    TROUGH_PRICE,
    PEAK_PRICE,
    PERCENT_GAIN,
    NUMBER_OF_DAYS,
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of the regime table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeRow {
    #[serde(rename = "Trough Date")]
    pub trough_date: NaiveDate,
    #[serde(rename = "Peak Date")]
    pub peak_date: NaiveDate,
    #[serde(rename = "Trough Price")]
    pub trough_price: f64,
    #[serde(rename = "Peak Price")]
    pub peak_price: f64,
    /// Signed: negative for bear markets.
    #[serde(rename = "Percent Gain")]
    pub percent_gain: f64,
    #[serde(rename = "Number Of Days")]
    pub number_of_days: i64,
}

impl From<&Regime> for RegimeRow {
    fn from(regime: &Regime) -> Self {
        Self {
            trough_date: regime.trough_date,
            peak_date: regime.peak_date,
            trough_price: regime.trough_price,
            peak_price: regime.peak_price,
            percent_gain: regime.percent_change,
            number_of_days: regime.duration_days,
        }
    }
}

/// Regime rows partitioned by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegimeTable {
    bear: Vec<RegimeRow>,
    bull: Vec<RegimeRow>,
}

impl RegimeTable {
    pub fn from_timeline(timeline: &Timeline) -> Self {
        let rows = |market_type| {
            let mut rows: Vec<RegimeRow> = timeline
                .of_type(market_type)
                .map(RegimeRow::from)
                .collect();
            // Stable, so equal trough dates keep timeline order
            rows.sort_by_key(|r| r.trough_date);
            rows
        };

        Self {
            bear: rows(MarketType::Bear),
            bull: rows(MarketType::Bull),
        }
    }

    pub fn bear(&self) -> &[RegimeRow] {
        &self.bear
    }

    pub fn bull(&self) -> &[RegimeRow] {
        &self.bull
    }

    pub fn rows(&self, market_type: MarketType) -> &[RegimeRow] {
        match market_type {
            MarketType::Bear => &self.bear,
            MarketType::Bull => &self.bull,
        }
    }

    /// Rows of one regime type as a DataFrame with the report columns.
    pub fn to_dataframe(&self, market_type: MarketType) -> PolarsResult<DataFrame> {
        let rows = self.rows(market_type);

        let trough_dates: Vec<String> = rows
            .iter()
            .map(|r| r.trough_date.format(DATE_FORMAT).to_string())
            .collect();
        let peak_dates: Vec<String> = rows
            .iter()
            .map(|r| r.peak_date.format(DATE_FORMAT).to_string())
            .collect();
        let trough_prices: Vec<f64> = rows.iter().map(|r| r.trough_price).collect();
        let peak_prices: Vec<f64> = rows.iter().map(|r| r.peak_price).collect();
        let gains: Vec<f64> = rows.iter().map(|r| r.percent_gain).collect();
        let days: Vec<i64> = rows.iter().map(|r| r.number_of_days).collect();

        DataFrame::new(vec![
            Series::new(TROUGH_DATE.into(), trough_dates).into(),
            Series::new(PEAK_DATE.into(), peak_dates).into(),
            Series::new(TROUGH_PRICE.into(), trough_prices).into(),
            Series::new(PEAK_PRICE.into(), peak_prices).into(),
            Series::new(PERCENT_GAIN.into(), gains).into(),
            Series::new(NUMBER_OF_DAYS.into(), days).into(),
        ])
    }
}
