//! Integrity checks for an acquired price series.
//!
//! Validates:
//! - Length (at least two samples)
//! - Date ordering (strictly increasing, no duplicates)
//! - Price validity (finite and positive)
//! - Date continuity (gaps longer than `max_gap_days`, reported only)

use crate::data::{PriceSeries, UpstreamError};
use crate::regime::MIN_SERIES_LEN;

/// Default largest tolerated gap between samples, in calendar days.
pub const DEFAULT_MAX_GAP_DAYS: i64 = 10;

/// How much a failed check matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Analysis cannot run on this series.
    Error,
    /// Reported, analysis still runs.
    Warning,
}

/// Result of a single validation check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub severity: Severity,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            severity: Severity::Error,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            severity: Severity::Error,
            message: message.to_string(),
            details,
        }
    }

    pub fn warn(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::fail(name, message, details)
        }
    }

    fn is_fatal(&self) -> bool {
        !self.passed && self.severity == Severity::Error
    }
}

/// Integrity report for one series.
#[derive(Debug)]
pub struct SeriesIntegrityReport {
    pub symbol: String,
    pub samples: usize,
    pub checks: Vec<CheckResult>,
}

impl SeriesIntegrityReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// No check failed with `Severity::Error`.
    pub fn is_usable(&self) -> bool {
        !self.checks.iter().any(CheckResult::is_fatal)
    }

    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        let total = self.checks.len();
        format!(
            "{} ({} samples): {}/{} checks passed",
            self.symbol, self.samples, passed, total
        )
    }

    /// Turn fatal failures into an upstream data error.
    pub fn into_result(self) -> Result<Self, UpstreamError> {
        let fatal: Vec<String> = self
            .checks
            .iter()
            .filter(|c| c.is_fatal())
            .map(|c| match &c.details {
                Some(details) => format!("{}: {} ({})", c.name, c.message, details),
                None => format!("{}: {}", c.name, c.message),
            })
            .collect();

        if fatal.is_empty() {
            Ok(self)
        } else {
            Err(UpstreamError::Integrity(format!(
                "{}: {}",
                self.symbol,
                fatal.join("; ")
            )))
        }
    }
}

/// Validator for price series.
#[derive(Debug, Clone)]
pub struct SeriesValidator {
    max_gap_days: i64,
}

impl Default for SeriesValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_GAP_DAYS)
    }
}

impl SeriesValidator {
    pub fn new(max_gap_days: i64) -> Self {
        Self { max_gap_days }
    }

    /// Run all checks.
    pub fn validate(&self, series: &PriceSeries) -> SeriesIntegrityReport {
        let checks = vec![
            self.check_length(series),
            self.check_date_ordering(series),
            self.check_price_validity(series),
            self.check_gaps(series),
        ];

        let report = SeriesIntegrityReport {
            symbol: series.symbol.clone(),
            samples: series.len(),
            checks,
        };

        for check in report.failed_checks() {
            match check.severity {
                Severity::Error => tracing::error!("{}: {}", check.name, check.message),
                Severity::Warning => tracing::warn!("{}: {}", check.name, check.message),
            }
        }

        report
    }

    fn check_length(&self, series: &PriceSeries) -> CheckResult {
        if series.len() >= MIN_SERIES_LEN {
            CheckResult::pass("min_length", &format!("{} samples", series.len()))
        } else {
            CheckResult::fail(
                "min_length",
                &format!(
                    "{} samples, at least {} required",
                    series.len(),
                    MIN_SERIES_LEN
                ),
                None,
            )
        }
    }

    /// Fail with `UpstreamError::Integrity` unless dates strictly increase.
    ///
    /// Runs on raw data, before resampling can merge or reorder samples.
    pub fn ensure_ordered(&self, series: &PriceSeries) -> Result<(), UpstreamError> {
        let check = self.check_date_ordering(series);
        if check.passed {
            return Ok(());
        }
        tracing::error!("{}: {}", check.name, check.message);
        Err(UpstreamError::Integrity(format!(
            "{}: {}: {} ({})",
            series.symbol,
            check.name,
            check.message,
            check.details.unwrap_or_default()
        )))
    }

    fn check_date_ordering(&self, series: &PriceSeries) -> CheckResult {
        let violations: Vec<String> = series
            .points()
            .windows(2)
            .filter(|w| w[1].date <= w[0].date)
            .map(|w| {
                if w[1].date == w[0].date {
                    format!("duplicate {}", w[1].date)
                } else {
                    format!("{} after {}", w[1].date, w[0].date)
                }
            })
            .collect();

        if violations.is_empty() {
            CheckResult::pass("date_ordering", "Dates strictly increasing")
        } else {
            CheckResult::fail(
                "date_ordering",
                &format!("{} ordering violations", violations.len()),
                Some(violations.into_iter().take(5).collect::<Vec<_>>().join(", ")),
            )
        }
    }

    fn check_price_validity(&self, series: &PriceSeries) -> CheckResult {
        let invalid: Vec<String> = series
            .points()
            .iter()
            .filter(|p| !p.price.is_finite() || p.price <= 0.0)
            .map(|p| format!("{}={}", p.date, p.price))
            .collect();

        if invalid.is_empty() {
            CheckResult::pass("price_validity", "All prices finite and positive")
        } else {
            CheckResult::fail(
                "price_validity",
                &format!("{} invalid prices", invalid.len()),
                Some(invalid.into_iter().take(5).collect::<Vec<_>>().join(", ")),
            )
        }
    }

    fn check_gaps(&self, series: &PriceSeries) -> CheckResult {
        let gaps: Vec<String> = series
            .points()
            .windows(2)
            .filter_map(|w| {
                let days = (w[1].date - w[0].date).num_days();
                (days > self.max_gap_days)
                    .then(|| format!("{} to {} ({} days)", w[0].date, w[1].date, days))
            })
            .collect();

        if gaps.is_empty() {
            CheckResult::pass("gap_continuity", "No gaps above threshold")
        } else {
            CheckResult::warn(
                "gap_continuity",
                &format!("{} gaps over {} days", gaps.len(), self.max_gap_days),
                Some(gaps.join(", ")),
            )
        }
    }
}
