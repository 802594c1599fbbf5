//! Bear/bull regime types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A detected bear market, in series indices.
///
/// `start <= trough`, and `trough <= end` when the interval is closed.
/// `end` is `None` when the series finishes before the market recovers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearInterval {
    /// Peak the decline is measured from.
    pub start: usize,
    /// Lowest point of the decline.
    pub trough: usize,
    /// Last point before the recovery threshold was crossed.
    pub end: Option<usize>,
    /// `(trough - start) / start * 100`, never positive.
    pub percent_loss: f64,
}

impl BearInterval {
    /// Whether the bear market was still running when the series ended.
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// End index, closing an open interval at `last_index`.
    pub fn end_or(&self, last_index: usize) -> usize {
        self.end.unwrap_or(last_index)
    }
}

/// Regime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketType {
    Bear,
    Bull,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bear => "Bear",
            Self::Bull => "Bull",
        }
    }

    /// Description of the regime.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Bear => "Sustained decline from a peak",
            Self::Bull => "Recovery and growth from a trough",
        }
    }
}

impl std::fmt::Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bear or bull market.
///
/// A bear market runs from `peak_date` down to `trough_date`; a bull
/// market runs from `trough_date` up to `peak_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regime {
    pub market_type: MarketType,
    pub trough_date: NaiveDate,
    pub peak_date: NaiveDate,
    pub trough_price: f64,
    pub peak_price: f64,
    /// Loss for a bear market, gain for a bull market.
    pub percent_change: f64,
    pub duration_days: i64,
}

impl Regime {
    pub fn is_bear(&self) -> bool {
        self.market_type == MarketType::Bear
    }

    pub fn is_bull(&self) -> bool {
        self.market_type == MarketType::Bull
    }

    /// First date of the regime's span.
    pub fn span_start(&self) -> NaiveDate {
        match self.market_type {
            MarketType::Bear => self.peak_date,
            MarketType::Bull => self.trough_date,
        }
    }

    /// Last date of the regime's span.
    pub fn span_end(&self) -> NaiveDate {
        match self.market_type {
            MarketType::Bear => self.trough_date,
            MarketType::Bull => self.peak_date,
        }
    }
}

/// Chronological sequence of regimes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    regimes: Vec<Regime>,
}

impl Timeline {
    pub fn new(regimes: Vec<Regime>) -> Self {
        Self { regimes }
    }

    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Regime> {
        self.regimes.iter()
    }

    pub fn len(&self) -> usize {
        self.regimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regimes.is_empty()
    }

    pub fn of_type(&self, market_type: MarketType) -> impl Iterator<Item = &Regime> {
        self.regimes.iter().filter(move |r| r.market_type == market_type)
    }

    pub fn bears(&self) -> impl Iterator<Item = &Regime> {
        self.of_type(MarketType::Bear)
    }

    pub fn bulls(&self) -> impl Iterator<Item = &Regime> {
        self.of_type(MarketType::Bull)
    }

    /// First and last date covered.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.regimes.first()?.span_start(), self.regimes.last()?.span_end()))
    }

    /// Each regime starts on the date the previous one ended.
    pub fn is_contiguous(&self) -> bool {
        self.regimes
            .windows(2)
            .all(|w| w[0].span_end() == w[1].span_start())
    }

    /// No two neighbouring regimes share a type.
    pub fn alternates(&self) -> bool {
        self.regimes
            .windows(2)
            .all(|w| w[0].market_type != w[1].market_type)
    }

    pub fn into_regimes(self) -> Vec<Regime> {
        self.regimes
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Regime;
    type IntoIter = std::slice::Iter<'a, Regime>;

    fn into_iter(self) -> Self::IntoIter {
        self.regimes.iter()
    }
}
