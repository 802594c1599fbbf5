//! Top-level error for a full analysis run.

use thiserror::Error;

use crate::config::ConfigError;
use crate::data::UpstreamError;
use crate::extrema::ExtremaError;
use crate::regime::RegimeError;
use crate::report::ReportError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Input validation failed: {0}")]
    InputValidation(#[from] RegimeError),

    #[error("Upstream data error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Extrema error: {0}")]
    Extrema(#[from] ExtremaError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
