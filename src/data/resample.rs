//! Fixed-cadence resampling.
//!
//! Bins are `cadence_days` calendar days wide and anchored at the first
//! sample's date. Each bin is labelled with its start date and takes the
//! last observation that falls inside it. Bins with no observation carry
//! the previous bin's value forward.

use chrono::Duration;

use super::loader::LoaderError;
use super::types::{PricePoint, PriceSeries};

/// Cadence used for weekly analysis.
pub const WEEKLY_CADENCE_DAYS: u32 = 7;

/// Resample to one point per `cadence_days`, last value wins, forward filled.
///
/// Dates must strictly increase; anything else is `LoaderError::InvalidData`.
pub fn resample_last(series: &PriceSeries, cadence_days: u32) -> Result<PriceSeries, LoaderError> {
    if cadence_days == 0 {
        return Err(LoaderError::InvalidData(
            "Resample cadence must be at least one day".to_string(),
        ));
    }

    let (first, last) = match series.date_range() {
        Some(range) => range,
        None => return Ok(series.clone()),
    };

    for pair in series.points().windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(LoaderError::InvalidData(format!(
                "Series dates must strictly increase: {} follows {}",
                pair[1].date, pair[0].date
            )));
        }
    }

    let cadence = i64::from(cadence_days);
    let bin_count = ((last - first).num_days() / cadence + 1) as usize;
    let mut bins: Vec<Option<f64>> = vec![None; bin_count];

    // Dates increase, so every offset lies in 0..=(last - first)
    for point in series.points() {
        let offset = (point.date - first).num_days();
        bins[(offset / cadence) as usize] = Some(point.price);
    }

    let mut points = Vec::with_capacity(bin_count);
    let mut carried: Option<f64> = None;
    for (k, value) in bins.into_iter().enumerate() {
        carried = value.or(carried);
        if let Some(price) = carried {
            let label = first + Duration::days(k as i64 * cadence);
            points.push(PricePoint::new(label, price));
        }
    }

    Ok(PriceSeries::new(series.symbol.clone(), points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_takes_last_value_in_bin() {
        // Mon..Fri of two weeks, second week missing Friday
        let series = PriceSeries::from_pairs(
            "SPX",
            vec![
                (date(2024, 1, 1), 10.0),
                (date(2024, 1, 3), 11.0),
                (date(2024, 1, 5), 12.0),
                (date(2024, 1, 8), 13.0),
                (date(2024, 1, 11), 14.0),
            ],
        );

        let weekly = resample_last(&series, WEEKLY_CADENCE_DAYS).unwrap();

        assert_eq!(weekly.dates(), vec![date(2024, 1, 1), date(2024, 1, 8)]);
        assert_eq!(weekly.prices(), vec![12.0, 14.0]);
    }

    #[test]
    fn test_empty_bins_forward_fill() {
        let series = PriceSeries::from_pairs(
            "SPX",
            vec![(date(2024, 1, 1), 10.0), (date(2024, 1, 22), 15.0)],
        );

        let weekly = resample_last(&series, 7).unwrap();

        assert_eq!(
            weekly.dates(),
            vec![
                date(2024, 1, 1),
                date(2024, 1, 8),
                date(2024, 1, 15),
                date(2024, 1, 22)
            ]
        );
        assert_eq!(weekly.prices(), vec![10.0, 10.0, 10.0, 15.0]);
    }

    #[test]
    fn test_zero_cadence_rejected() {
        let series = PriceSeries::from_pairs("SPX", vec![(date(2024, 1, 1), 10.0)]);
        assert!(resample_last(&series, 0).is_err());
    }

    #[test]
    fn test_unsorted_dates_rejected() {
        // A later date in the middle must not index past the last bin
        let series = PriceSeries::from_pairs(
            "SPX",
            vec![
                (date(2000, 1, 1), 10.0),
                (date(2000, 1, 30), 11.0),
                (date(2000, 1, 8), 12.0),
            ],
        );
        assert!(matches!(
            resample_last(&series, 7),
            Err(LoaderError::InvalidData(_))
        ));
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let series = PriceSeries::from_pairs(
            "SPX",
            vec![
                (date(2000, 1, 1), 10.0),
                (date(2000, 1, 3), 11.0),
                (date(2000, 1, 3), 12.0),
            ],
        );
        assert!(matches!(
            resample_last(&series, 7),
            Err(LoaderError::InvalidData(_))
        ));
    }

    #[test]
    fn test_empty_series_passes_through() {
        let series = PriceSeries::new("SPX", vec![]);
        let resampled = resample_last(&series, 7).unwrap();
        assert!(resampled.is_empty());
    }
}
