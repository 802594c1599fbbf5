//! Bear market detector.
//!
//! A bear market starts when the price falls `recovery_limit` below an
//! anchor peak and ends when it rises `recovery_limit` above the lowest
//! point reached since. Each anchor is scanned forward once:
//!
//! - a new high above the anchor abandons it and becomes the next anchor
//! - a close at or below `peak * (1 - limit)` enters the bear market
//! - inside a bear market, a close at or above `trough * (1 + limit)` ends
//!   it on the previous sample, and scanning resumes from that sample

use thiserror::Error;
use tracing::{debug, info};

use super::types::BearInterval;

/// Minimum number of samples the detector accepts.
pub const MIN_SERIES_LEN: usize = 2;

/// Input validation errors for regime analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegimeError {
    #[error("Price series is empty")]
    EmptySeries,

    #[error("Insufficient data: required {required} points, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("Invalid recovery limit {0}: must be a finite value in (0, 1)")]
    InvalidRecoveryLimit(f64),

    #[error("Invalid price {value} at index {index}: prices must be finite and positive")]
    InvalidPrice { index: usize, value: f64 },

    #[error("Invalid bear interval #{position}: {reason}")]
    InvalidInterval { position: usize, reason: String },
}

pub type RegimeResult<T> = Result<T, RegimeError>;

/// Check the recovery limit lies in (0, 1).
pub fn validate_recovery_limit(recovery_limit: f64) -> RegimeResult<()> {
    if recovery_limit.is_finite() && recovery_limit > 0.0 && recovery_limit < 1.0 {
        Ok(())
    } else {
        Err(RegimeError::InvalidRecoveryLimit(recovery_limit))
    }
}

/// Check the series is long enough and every price is finite and positive.
pub fn validate_prices(prices: &[f64]) -> RegimeResult<()> {
    if prices.is_empty() {
        return Err(RegimeError::EmptySeries);
    }
    if prices.len() < MIN_SERIES_LEN {
        return Err(RegimeError::InsufficientData {
            required: MIN_SERIES_LEN,
            got: prices.len(),
        });
    }
    if let Some((index, &value)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
        return Err(RegimeError::InvalidPrice { index, value });
    }
    Ok(())
}

/// Scan state for a single anchor.
#[derive(Debug, Clone, Copy)]
enum ScanState {
    /// Below the anchor but above the entry threshold.
    Scanning,
    /// Entry threshold crossed; tracking the running minimum.
    InBear { min_idx: usize, min_value: f64 },
}

/// How the scan from one anchor finished.
#[derive(Debug)]
enum AnchorOutcome {
    /// Price exceeded the anchor; restart from this index.
    NewHigh(usize),
    /// Bear market closed by a recovery; resume from its end.
    Recovered(BearInterval, usize),
    /// Series ended inside a bear market.
    Open(BearInterval),
    /// Series ended without entering a bear market.
    Exhausted,
}

/// Threshold-based bear market detector.
#[derive(Debug, Clone, Copy)]
pub struct BearMarketDetector {
    recovery_limit: f64,
}

impl BearMarketDetector {
    /// Create a detector with a fractional threshold (0.20 = 20%).
    pub fn new(recovery_limit: f64) -> RegimeResult<Self> {
        validate_recovery_limit(recovery_limit)?;
        Ok(Self { recovery_limit })
    }

    pub fn recovery_limit(&self) -> f64 {
        self.recovery_limit
    }

    /// Detect bear markets, in chronological order.
    pub fn detect(&self, prices: &[f64]) -> RegimeResult<Vec<BearInterval>> {
        validate_prices(prices)?;

        let intervals = self.scan(prices);

        info!(
            "Detected {} bear markets in {} samples (limit {:.0}%)",
            intervals.len(),
            prices.len(),
            self.recovery_limit * 100.0
        );
        Ok(intervals)
    }

    fn scan(&self, prices: &[f64]) -> Vec<BearInterval> {
        let mut intervals = Vec::new();
        let mut anchor = 0;

        while anchor + 1 < prices.len() {
            match self.scan_from(prices, anchor) {
                AnchorOutcome::NewHigh(next) => anchor = next,
                AnchorOutcome::Recovered(interval, resume_at) => {
                    debug!(
                        "Bear market {} -> {} (trough {}), {:.2}%",
                        interval.start, resume_at, interval.trough, interval.percent_loss
                    );
                    intervals.push(interval);
                    anchor = resume_at;
                }
                AnchorOutcome::Open(interval) => {
                    debug!(
                        "Bear market from {} still open at series end (trough {}), {:.2}%",
                        interval.start, interval.trough, interval.percent_loss
                    );
                    intervals.push(interval);
                    break;
                }
                // Every later price stayed within (entry level, peak] of this
                // anchor, so no later, lower anchor can breach its own level.
                AnchorOutcome::Exhausted => break,
            }
        }

        intervals
    }

    fn scan_from(&self, prices: &[f64], anchor: usize) -> AnchorOutcome {
        let peak = prices[anchor];
        let entry_level = peak * (1.0 - self.recovery_limit);
        let mut state = ScanState::Scanning;

        for (j, &price) in prices.iter().enumerate().skip(anchor + 1) {
            state = match state {
                ScanState::Scanning if price > peak => return AnchorOutcome::NewHigh(j),
                ScanState::Scanning if price <= entry_level => ScanState::InBear {
                    min_idx: j,
                    min_value: price,
                },
                ScanState::Scanning => ScanState::Scanning,
                ScanState::InBear { min_value, .. } if price < min_value => ScanState::InBear {
                    min_idx: j,
                    min_value: price,
                },
                ScanState::InBear { min_idx, min_value }
                    if price >= min_value * (1.0 + self.recovery_limit) =>
                {
                    let end = j - 1;
                    let interval = bear_interval(prices, anchor, min_idx, Some(end));
                    return AnchorOutcome::Recovered(interval, end);
                }
                in_bear => in_bear,
            };
        }

        match state {
            ScanState::InBear { min_idx, .. } => {
                AnchorOutcome::Open(bear_interval(prices, anchor, min_idx, None))
            }
            ScanState::Scanning => AnchorOutcome::Exhausted,
        }
    }
}

fn bear_interval(prices: &[f64], start: usize, trough: usize, end: Option<usize>) -> BearInterval {
    let peak = prices[start];
    BearInterval {
        start,
        trough,
        end,
        percent_loss: (prices[trough] - peak) / peak * 100.0,
    }
}

/// Detect bear markets with a one-off detector.
pub fn detect(prices: &[f64], recovery_limit: f64) -> RegimeResult<Vec<BearInterval>> {
    BearMarketDetector::new(recovery_limit)?.detect(prices)
}
