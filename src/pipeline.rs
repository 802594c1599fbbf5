//! End-to-end regime analysis.
//!
//! Pipeline:
//! 1. Fetch the raw series from a [`PriceSource`]
//! 2. Check date ordering on the raw data, then restrict to the configured
//!    dates and resample to the configured cadence
//! 3. Validate prices for the detector, then run the remaining integrity checks
//! 4. Detect bear markets and synthesize the bull markets around them
//! 5. Build the report and hand it to the sinks

use tracing::info;

use crate::config::AnalysisConfig;
use crate::data::{resample_last, PriceSeries, PriceSource, UpstreamError};
use crate::error::AnalysisResult;
use crate::regime::detector::validate_prices;
use crate::regime::{synthesize, BearMarketDetector};
use crate::report::{RegimeReport, RegimeSink};
use crate::validation::SeriesValidator;

/// Runs regime analysis with one configuration.
#[derive(Debug, Clone)]
pub struct RegimeAnalyzer {
    config: AnalysisConfig,
    detector: BearMarketDetector,
    validator: SeriesValidator,
}

impl RegimeAnalyzer {
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        let detector = BearMarketDetector::new(config.recovery_limit)?;
        let validator = SeriesValidator::new(config.max_gap_days);

        Ok(Self {
            config,
            detector,
            validator,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Restrict a raw series to the configured window and cadence.
    ///
    /// Duplicate or out-of-order dates are an upstream error here, since
    /// resampling would otherwise hide them.
    pub fn prepare(&self, raw: &PriceSeries) -> AnalysisResult<PriceSeries> {
        self.validator.ensure_ordered(raw)?;
        let sliced = raw.slice_dates(self.config.start_date, self.config.end_date);
        if self.config.cadence_days == 0 || sliced.is_empty() {
            return Ok(sliced);
        }
        let resampled = resample_last(&sliced, self.config.cadence_days)
            .map_err(UpstreamError::from)?;
        Ok(resampled)
    }

    /// Analyze an already prepared series.
    ///
    /// Too few samples or bad prices are input validation errors; unordered
    /// dates are upstream errors.
    pub fn analyze(&self, series: &PriceSeries) -> AnalysisResult<RegimeReport> {
        let prices = series.prices();
        validate_prices(&prices)?;

        let integrity = self.validator.validate(series).into_result()?;
        info!("{}", integrity.summary());

        let intervals = self.detector.detect(&prices)?;
        let timeline = synthesize(series, &intervals)?;

        let report = RegimeReport::new(
            series.symbol.clone(),
            self.detector.recovery_limit(),
            timeline,
        );
        info!(
            "{}: {} bear and {} bull markets",
            report.symbol, report.bear_stats.count, report.bull_stats.count
        );
        Ok(report)
    }

    /// Fetch, prepare and analyze the configured ticker.
    pub async fn run(&self, source: &PriceSource) -> AnalysisResult<RegimeReport> {
        info!(
            "Fetching {} from {} ({} to {})",
            self.config.ticker,
            source.describe(),
            self.config.start_date,
            self.config.end_date
        );
        let raw = source
            .fetch(
                &self.config.ticker,
                self.config.start_date,
                self.config.end_date,
            )
            .await?;

        let series = self.prepare(&raw)?;
        info!(
            "Prepared {} samples from {} raw (cadence {} days)",
            series.len(),
            raw.len(),
            self.config.cadence_days
        );
        self.analyze(&series)
    }

    /// Write the report to every sink, stopping at the first failure.
    pub fn publish(
        &self,
        report: &RegimeReport,
        sinks: &mut [&mut dyn RegimeSink],
    ) -> AnalysisResult<()> {
        for sink in sinks.iter_mut() {
            sink.write(report)?;
        }
        Ok(())
    }
}
