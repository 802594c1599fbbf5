//! Validation of acquired price data.
//!
//! Runs before any regime analysis so that upstream problems (empty
//! downloads, unsorted or duplicated dates, bad prices) surface as data
//! errors rather than as analysis failures.

pub mod series_integrity;

pub use series_integrity::{
    CheckResult, SeriesIntegrityReport, SeriesValidator, Severity, DEFAULT_MAX_GAP_DAYS,
};
