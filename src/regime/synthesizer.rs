//! Bull market synthesis.
//!
//! Turns detected bear intervals into a full timeline: every stretch not
//! covered by a bear market (from the series start, between a trough and
//! the next peak, after the last trough) becomes a bull market.

use super::detector::{validate_prices, RegimeError, RegimeResult};
use super::types::{BearInterval, MarketType, Regime, Timeline};
use crate::data::PriceSeries;

/// Build the chronological bear/bull timeline for `series`.
///
/// A bull market is inserted before each bear market, except before a bear
/// market starting on the first sample. Between two bear markets the bull
/// market may be zero-length. A trailing bull market is added unless the
/// last trough is the final sample.
pub fn synthesize(series: &PriceSeries, intervals: &[BearInterval]) -> RegimeResult<Timeline> {
    validate_prices(&series.prices())?;
    validate_intervals(intervals, series.len())?;

    let last_index = series.len() - 1;
    let mut regimes = Vec::with_capacity(intervals.len() * 2 + 1);
    let mut previous_trough: Option<usize> = None;

    for interval in intervals {
        match previous_trough {
            Some(trough) => regimes.push(bull_regime(series, trough, interval.start)),
            None if interval.start > 0 => regimes.push(bull_regime(series, 0, interval.start)),
            None => {}
        }
        regimes.push(bear_regime(series, interval, last_index));
        previous_trough = Some(interval.trough);
    }

    match previous_trough {
        None => regimes.push(bull_regime(series, 0, last_index)),
        Some(trough) if trough < last_index => {
            regimes.push(bull_regime(series, trough, last_index))
        }
        Some(_) => {}
    }

    Ok(Timeline::new(regimes))
}

/// Check intervals are in range, internally ordered, and chronological.
fn validate_intervals(intervals: &[BearInterval], len: usize) -> RegimeResult<()> {
    let invalid = |position: usize, reason: String| RegimeError::InvalidInterval { position, reason };

    let mut previous: Option<&BearInterval> = None;
    for (position, interval) in intervals.iter().enumerate() {
        if interval.trough >= len {
            return Err(invalid(
                position,
                format!("trough index {} outside series of {}", interval.trough, len),
            ));
        }
        if interval.start > interval.trough {
            return Err(invalid(
                position,
                format!("start {} after trough {}", interval.start, interval.trough),
            ));
        }
        if let Some(end) = interval.end {
            if end < interval.trough || end >= len {
                return Err(invalid(
                    position,
                    format!("end {} not in [{}, {})", end, interval.trough, len),
                ));
            }
        }
        if let Some(prev) = previous {
            if prev.is_open() {
                return Err(invalid(
                    position,
                    "follows a bear market that never ended".to_string(),
                ));
            }
            if interval.start < prev.trough {
                return Err(invalid(
                    position,
                    format!("start {} precedes previous trough {}", interval.start, prev.trough),
                ));
            }
        }
        previous = Some(interval);
    }
    Ok(())
}

fn bear_regime(series: &PriceSeries, interval: &BearInterval, last_index: usize) -> Regime {
    let points = series.points();
    let peak = points[interval.start];
    let trough = points[interval.trough];
    let end = points[interval.end_or(last_index)];

    Regime {
        market_type: MarketType::Bear,
        trough_date: trough.date,
        peak_date: peak.date,
        trough_price: trough.price,
        peak_price: peak.price,
        percent_change: interval.percent_loss,
        duration_days: (end.date - peak.date).num_days(),
    }
}

fn bull_regime(series: &PriceSeries, from: usize, to: usize) -> Regime {
    let points = series.points();
    let trough = points[from];
    let peak = points[to];

    Regime {
        market_type: MarketType::Bull,
        trough_date: trough.date,
        peak_date: peak.date,
        trough_price: trough.price,
        peak_price: peak.price,
        percent_change: (peak.price - trough.price) / trough.price * 100.0,
        duration_days: (peak.date - trough.date).num_days(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::detector::detect;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

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

    #[test]
    fn test_bear_then_trailing_bull() {
        let series = weekly(&[100.0, 90.0, 79.0, 85.0, 95.0]);
        let intervals = detect(&series.prices(), 0.20).unwrap();
        let timeline = synthesize(&series, &intervals).unwrap();

        assert_eq!(timeline.len(), 2);
        let bear = &timeline.regimes()[0];
        assert!(bear.is_bear());
        assert_eq!(bear.peak_price, 100.0);
        assert_eq!(bear.trough_price, 79.0);
        assert_eq!(bear.duration_days, 21);
        assert_relative_eq!(bear.percent_change, -21.0, epsilon = 1e-9);

        let bull = &timeline.regimes()[1];
        assert!(bull.is_bull());
        assert_eq!(bull.trough_date, bear.trough_date);
        assert_eq!(bull.peak_price, 95.0);
        assert_eq!(bull.duration_days, 14);
        assert_relative_eq!(bull.percent_change, (95.0 - 79.0) / 79.0 * 100.0, epsilon = 1e-9);

        assert!(timeline.is_contiguous());
        assert_eq!(timeline.date_range(), series.date_range());
    }

    #[test]
    fn test_no_bear_markets_is_one_bull() {
        let series = weekly(&[100.0, 101.0, 102.0, 103.0]);
        let timeline = synthesize(&series, &[]).unwrap();

        assert_eq!(timeline.len(), 1);
        let bull = &timeline.regimes()[0];
        assert!(bull.is_bull());
        assert_eq!(bull.duration_days, 21);
        assert_relative_eq!(bull.percent_change, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_open_bear_market_closes_at_series_end() {
        let series = weekly(&[100.0, 110.0, 95.0, 85.0, 80.0]);
        let intervals = detect(&series.prices(), 0.20).unwrap();
        assert_eq!(intervals.len(), 1);
        assert!(intervals[0].is_open());

        let timeline = synthesize(&series, &intervals).unwrap();

        assert_eq!(timeline.len(), 2);
        assert!(timeline.regimes()[0].is_bull());
        let bear = &timeline.regimes()[1];
        assert!(bear.is_bear());
        // from the 110 peak to the last sample
        assert_eq!(bear.duration_days, 21);
        assert_eq!(bear.trough_price, 80.0);
    }

    #[test]
    fn test_open_bear_market_with_earlier_trough_gets_trailing_bull() {
        let series = weekly(&[100.0, 70.0, 60.0, 65.0, 68.0]);
        let intervals = detect(&series.prices(), 0.20).unwrap();
        assert_eq!(intervals.len(), 1);
        assert!(intervals[0].is_open());
        assert_eq!(intervals[0].trough, 2);

        let timeline = synthesize(&series, &intervals).unwrap();
        let regimes = timeline.regimes();

        assert_eq!(regimes.len(), 2);
        assert!(regimes[0].is_bear());
        assert!(regimes[1].is_bull());
        assert!(timeline.is_contiguous());

        let bear = &regimes[0];
        // still open, so the bear market runs to the last sample
        assert_eq!(bear.duration_days, 28);
        assert_eq!(bear.trough_price, 60.0);
        assert_relative_eq!(bear.percent_change, -40.0, epsilon = 1e-9);

        let bull = &regimes[1];
        assert_eq!(bull.trough_date, bear.trough_date);
        assert_eq!(bull.peak_date, series.points()[4].date);
        assert_eq!(bull.peak_price, 68.0);
        assert_eq!(bull.duration_days, 14);
        assert_relative_eq!(bull.percent_change, 8.0 / 60.0 * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_back_to_back_bears_get_zero_length_bull() {
        let series = weekly(&[100.0, 70.0, 60.0, 40.0, 80.0]);
        let intervals = vec![
            BearInterval {
                start: 0,
                trough: 1,
                end: Some(1),
                percent_loss: -30.0,
            },
            BearInterval {
                start: 1,
                trough: 3,
                end: Some(3),
                percent_loss: (40.0 - 70.0) / 70.0 * 100.0,
            },
        ];

        let timeline = synthesize(&series, &intervals).unwrap();
        let types: Vec<MarketType> = timeline.iter().map(|r| r.market_type).collect();

        assert_eq!(
            types,
            vec![
                MarketType::Bear,
                MarketType::Bull,
                MarketType::Bear,
                MarketType::Bull
            ]
        );
        assert_eq!(timeline.regimes()[1].duration_days, 0);
        assert!(timeline.alternates());
        assert!(timeline.is_contiguous());
    }

    #[test]
    fn test_rejects_degenerate_series() {
        let series = weekly(&[100.0]);
        assert!(matches!(
            synthesize(&series, &[]),
            Err(RegimeError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_interval() {
        let series = weekly(&[100.0, 70.0, 90.0]);
        let intervals = vec![BearInterval {
            start: 0,
            trough: 5,
            end: None,
            percent_loss: -30.0,
        }];
        assert!(matches!(
            synthesize(&series, &intervals),
            Err(RegimeError::InvalidInterval { position: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_overlapping_intervals() {
        let series = weekly(&[100.0, 70.0, 60.0, 90.0, 50.0]);
        let intervals = vec![
            BearInterval {
                start: 0,
                trough: 2,
                end: Some(2),
                percent_loss: -40.0,
            },
            BearInterval {
                start: 1,
                trough: 4,
                end: None,
                percent_loss: -28.0,
            },
        ];
        assert!(matches!(
            synthesize(&series, &intervals),
            Err(RegimeError::InvalidInterval { position: 1, .. })
        ));
    }
}
