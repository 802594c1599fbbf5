//! Property-based testing for bear/bull regime invariants
//!
//! Invariants:
//! 1. Ordering: bear intervals never overlap and are chronological
//! 2. Trough: the trough is the lowest and the start the highest price of its interval
//! 3. Depth: every bear market fell at least the recovery limit
//! 4. Repeatability: detection is a pure function of its input
//! 5. Coverage: the timeline spans the whole series without gaps or overlaps
//! 6. Alternation: bear and bull markets alternate
//! 7. Early stop: ending the scan at an anchor that never enters a bear market
//!    gives the same intervals as retrying from every later index

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use market_cycles::data::PriceSeries;
use market_cycles::regime::{detect, synthesize, BearInterval, MarketType};

fn random_walk(returns: &[f64]) -> Vec<f64> {
    let mut price = 100.0;
    let mut prices = Vec::with_capacity(returns.len() + 1);
    prices.push(price);
    for r in returns {
        price *= 1.0 + r;
        prices.push(price);
    }
    prices
}

fn weekly(prices: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(1950, 1, 6).unwrap();
    PriceSeries::from_pairs(
        "WALK",
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| (start + Duration::days(7 * i as i64), p)),
    )
}

/// Straightforward scan that retries from the next index whenever an anchor
/// neither makes a new high nor enters a bear market.
fn restarting_scan(prices: &[f64], limit: f64) -> Vec<BearInterval> {
    let mut intervals = Vec::new();
    let mut i = 0;

    while i + 1 < prices.len() {
        let peak = prices[i];
        let mut trough: Option<usize> = None;
        let mut next: Option<usize> = None;

        for (j, &p) in prices.iter().enumerate().skip(i + 1) {
            match trough {
                None if p > peak => {
                    next = Some(j);
                    break;
                }
                None if p <= peak * (1.0 - limit) => trough = Some(j),
                None => {}
                Some(t) if p < prices[t] => trough = Some(j),
                Some(t) if p >= prices[t] * (1.0 + limit) => {
                    intervals.push(BearInterval {
                        start: i,
                        trough: t,
                        end: Some(j - 1),
                        percent_loss: (prices[t] - peak) / peak * 100.0,
                    });
                    next = Some(j - 1);
                    break;
                }
                Some(_) => {}
            }
        }

        match (next, trough) {
            (Some(k), _) => i = k,
            (None, Some(t)) => {
                intervals.push(BearInterval {
                    start: i,
                    trough: t,
                    end: None,
                    percent_loss: (prices[t] - peak) / peak * 100.0,
                });
                break;
            }
            (None, None) => i += 1,
        }
    }

    intervals
}

fn walk_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.08f64..0.08, 1..300).prop_map(|r| random_walk(&r))
}

proptest! {
    #[test]
    fn intervals_are_ordered_and_disjoint(
        prices in walk_strategy(),
        limit in 0.05f64..0.5,
    ) {
        let intervals = detect(&prices, limit).unwrap();

        for pair in intervals.windows(2) {
            let end = pair[0].end;
            prop_assert!(end.is_some(), "only the last interval may be open");
            prop_assert!(pair[1].start >= end.unwrap());
        }
        for interval in &intervals {
            prop_assert!(interval.start <= interval.trough);
            if let Some(end) = interval.end {
                prop_assert!(interval.trough <= end);
                prop_assert!(end < prices.len());
            }
        }
    }

    #[test]
    fn trough_is_interval_minimum(
        prices in walk_strategy(),
        limit in 0.05f64..0.5,
    ) {
        let last = prices.len() - 1;
        for interval in detect(&prices, limit).unwrap() {
            let span = &prices[interval.start..=interval.end_or(last)];
            let trough = prices[interval.trough];
            let peak = prices[interval.start];

            prop_assert!(interval.percent_loss <= 0.0);
            prop_assert!(span.iter().all(|&p| trough <= p));
            prop_assert!(span.iter().all(|&p| p <= peak));
            prop_assert!(trough <= peak * (1.0 - limit));
        }
    }

    #[test]
    fn detection_is_repeatable(
        prices in walk_strategy(),
        limit in 0.05f64..0.5,
    ) {
        prop_assert_eq!(detect(&prices, limit).unwrap(), detect(&prices, limit).unwrap());
    }

    #[test]
    fn detection_matches_restarting_scan(
        prices in walk_strategy(),
        limit in 0.05f64..0.5,
    ) {
        prop_assert_eq!(detect(&prices, limit).unwrap(), restarting_scan(&prices, limit));
    }

    #[test]
    fn timeline_covers_series(
        prices in walk_strategy(),
        limit in 0.05f64..0.5,
    ) {
        let series = weekly(&prices);
        let intervals = detect(&prices, limit).unwrap();
        let timeline = synthesize(&series, &intervals).unwrap();

        prop_assert!(!timeline.is_empty());
        prop_assert!(timeline.is_contiguous());
        prop_assert!(timeline.alternates());
        prop_assert_eq!(timeline.date_range(), series.date_range());
        prop_assert_eq!(timeline.bears().count(), intervals.len());
        prop_assert!(timeline.iter().all(|r| r.duration_days >= 0));
    }

    #[test]
    fn bull_markets_end_at_peaks(
        prices in walk_strategy(),
        limit in 0.05f64..0.5,
    ) {
        let series = weekly(&prices);
        let intervals = detect(&prices, limit).unwrap();
        let timeline = synthesize(&series, &intervals).unwrap();

        for pair in timeline.regimes().windows(2) {
            if pair[0].market_type == MarketType::Bull {
                // The bull market hands over at the next bear market's peak
                prop_assert_eq!(pair[0].peak_date, pair[1].peak_date);
                prop_assert_eq!(pair[0].peak_price, pair[1].peak_price);
            }
        }
    }
}
