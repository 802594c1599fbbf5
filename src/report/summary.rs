//! Aggregate statistics over a regime timeline.

use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::Statistics;

use super::table::RegimeTable;
use crate::regime::{MarketType, Timeline};

/// Statistics for one regime type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegimeStats {
    pub count: usize,
    pub total_days: i64,
    /// Share of the covered calendar span, in percent. Measured over the
    /// peak-to-trough (bear) or trough-to-peak (bull) spans, which tile the
    /// timeline, so bear and bull shares add up to 100.
    pub pct_of_time: f64,
    pub avg_duration_days: f64,
    pub max_duration_days: i64,
    pub avg_percent_change: f64,
    /// Largest gain for bull markets, smallest loss for bear markets.
    pub best_percent_change: f64,
    /// Smallest gain for bull markets, deepest loss for bear markets.
    pub worst_percent_change: f64,
}

impl RegimeStats {
    pub fn from_timeline(timeline: &Timeline, market_type: MarketType) -> Self {
        let regimes: Vec<_> = timeline.of_type(market_type).collect();
        if regimes.is_empty() {
            return Self::default();
        }

        let span_days = timeline
            .date_range()
            .map(|(start, end)| (end - start).num_days())
            .unwrap_or(0);

        let durations: Vec<f64> = regimes.iter().map(|r| r.duration_days as f64).collect();
        let changes: Vec<f64> = regimes.iter().map(|r| r.percent_change).collect();
        let total_days: i64 = regimes.iter().map(|r| r.duration_days).sum();
        let span_covered: i64 = regimes
            .iter()
            .map(|r| (r.span_end() - r.span_start()).num_days())
            .sum();

        Self {
            count: regimes.len(),
            total_days,
            pct_of_time: if span_days > 0 {
                span_covered as f64 / span_days as f64 * 100.0
            } else {
                0.0
            },
            avg_duration_days: Statistics::mean(&durations),
            max_duration_days: regimes.iter().map(|r| r.duration_days).max().unwrap_or(0),
            avg_percent_change: Statistics::mean(&changes),
            best_percent_change: Statistics::max(&changes),
            worst_percent_change: Statistics::min(&changes),
        }
    }
}

/// Result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct RegimeReport {
    pub symbol: String,
    pub recovery_limit: f64,
    pub timeline: Timeline,
    #[serde(skip)]
    pub table: RegimeTable,
    pub bear_stats: RegimeStats,
    pub bull_stats: RegimeStats,
}

impl RegimeReport {
    pub fn new(symbol: impl Into<String>, recovery_limit: f64, timeline: Timeline) -> Self {
        let table = RegimeTable::from_timeline(&timeline);
        let bear_stats = RegimeStats::from_timeline(&timeline, MarketType::Bear);
        let bull_stats = RegimeStats::from_timeline(&timeline, MarketType::Bull);

        Self {
            symbol: symbol.into(),
            recovery_limit,
            timeline,
            table,
            bear_stats,
            bull_stats,
        }
    }

    pub fn stats(&self, market_type: MarketType) -> &RegimeStats {
        match market_type {
            MarketType::Bear => &self.bear_stats,
            MarketType::Bull => &self.bull_stats,
        }
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.timeline.date_range()
    }

    /// Human-readable summary.
    pub fn summary(&self) -> String {
        let period = match self.date_range() {
            Some((start, end)) => format!("{} to {}", start, end),
            None => "empty".to_string(),
        };
        let bear = &self.bear_stats;
        let bull = &self.bull_stats;

        format!(
            "Regime Summary: {}\n\
             ====================\n\
             \n\
             Period: {}\n\
             Threshold: {:.1}%\n\
             \n\
             Bear Markets: {}\n\
             Time in Bear: {:.1}%\n\
             Avg Duration: {:.0} days (max {})\n\
             Avg Loss: {:.2}%\n\
             Deepest Loss: {:.2}%\n\
             \n\
             Bull Markets: {}\n\
             Time in Bull: {:.1}%\n\
             Avg Duration: {:.0} days (max {})\n\
             Avg Gain: {:.2}%\n\
             Largest Gain: {:.2}%",
            self.symbol,
            period,
            self.recovery_limit * 100.0,
            bear.count,
            bear.pct_of_time,
            bear.avg_duration_days,
            bear.max_duration_days,
            bear.avg_percent_change,
            bear.worst_percent_change,
            bull.count,
            bull.pct_of_time,
            bull.avg_duration_days,
            bull.max_duration_days,
            bull.avg_percent_change,
            bull.best_percent_change,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceSeries;
    use crate::regime::{detect, synthesize};
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn weekly(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
        PriceSeries::from_pairs(
            "TEST",
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| (start + Duration::days(7 * i as i64), p)),
        )
    }

    fn report(prices: &[f64]) -> RegimeReport {
        let series = weekly(prices);
        let intervals = detect(&series.prices(), 0.20).unwrap();
        let timeline = synthesize(&series, &intervals).unwrap();
        RegimeReport::new("TEST", 0.20, timeline)
    }

    #[test]
    fn test_stats_cover_the_span() {
        let report = report(&[100.0, 90.0, 79.0, 85.0, 95.0]);

        assert_eq!(report.bear_stats.count, 1);
        assert_eq!(report.bear_stats.total_days, 21);
        assert_relative_eq!(report.bear_stats.avg_percent_change, -21.0, epsilon = 1e-9);

        assert_eq!(report.bull_stats.count, 1);
        assert_eq!(report.bull_stats.total_days, 14);
        // Time shares follow the peak/trough spans: 14 of 28 days each
        assert_relative_eq!(report.bear_stats.pct_of_time, 50.0, epsilon = 1e-9);
        assert_relative_eq!(report.bull_stats.pct_of_time, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_time_shares_add_up_to_whole_span() {
        // Bear duration runs past the trough, the time share does not
        let report = report(&[100.0, 70.0, 90.0, 88.0, 60.0, 80.0, 85.0]);
        let total = report.bear_stats.pct_of_time + report.bull_stats.pct_of_time;

        assert!(report.bear_stats.total_days > 0);
        assert_relative_eq!(total, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_type_has_default_stats() {
        let report = report(&[100.0, 110.0, 120.0]);

        assert_eq!(report.bear_stats, RegimeStats::default());
        assert_eq!(report.bull_stats.count, 1);
        assert_relative_eq!(report.bull_stats.pct_of_time, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_best_and_worst() {
        let report = report(&[100.0, 70.0, 90.0, 88.0, 60.0, 80.0]);
        let bear = report.stats(MarketType::Bear);

        assert_eq!(bear.count, 2);
        assert!(bear.worst_percent_change <= bear.best_percent_change);
        assert!(bear.best_percent_change <= 0.0);
    }

    #[test]
    fn test_summary_text() {
        let report = report(&[100.0, 90.0, 79.0, 85.0, 95.0]);
        let text = report.summary();

        assert!(text.contains("Regime Summary: TEST"));
        assert!(text.contains("Threshold: 20.0%"));
        assert!(text.contains("Bear Markets: 1"));
        assert!(text.contains("Deepest Loss: -21.00%"));
    }
}
