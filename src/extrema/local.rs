//! Rolling-window local extrema.
//!
//! A sample is a local maximum (minimum) when it equals the maximum
//! (minimum) of the centered window around it. Windows that would run past
//! either end of the series produce nothing. Within each column a value
//! already reported earlier is masked, so plateaus are counted once.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::PriceSeries;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtremaError {
    #[error("Window size must be at least 1")]
    ZeroWindow,

    #[error("Window size {window} is larger than the series ({len} samples)")]
    WindowTooLarge { window: usize, len: usize },

    #[error("Invalid window range: {min}..={max}")]
    InvalidRange { min: usize, max: usize },
}

/// A sample that is a local maximum, a local minimum, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalExtremum {
    pub index: usize,
    pub date: NaiveDate,
    /// Price when this sample is a (first-seen) local maximum.
    pub local_max: Option<f64>,
    /// Price when this sample is a (first-seen) local minimum.
    pub local_min: Option<f64>,
}

/// Find local extrema with a centered window of `window` samples.
pub fn find_local_extrema(
    series: &PriceSeries,
    window: usize,
) -> Result<Vec<LocalExtremum>, ExtremaError> {
    if window == 0 {
        return Err(ExtremaError::ZeroWindow);
    }
    if window > series.len() {
        return Err(ExtremaError::WindowTooLarge {
            window,
            len: series.len(),
        });
    }

    let points = series.points();
    // Even windows lean one sample to the left of center
    let offset = (window - 1) / 2;

    let mut extrema = Vec::new();
    for (t, point) in points.iter().enumerate() {
        let hi = t + offset;
        let Some(lo) = (hi + 1).checked_sub(window) else {
            continue;
        };
        if hi >= points.len() {
            break;
        }

        let (min, max) = points[lo..=hi]
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
                (min.min(p.price), max.max(p.price))
            });

        let is_max = point.price == max;
        let is_min = point.price == min;
        if is_max || is_min {
            extrema.push(LocalExtremum {
                index: t,
                date: point.date,
                local_max: is_max.then_some(point.price),
                local_min: is_min.then_some(point.price),
            });
        }
    }

    mask_repeats(&mut extrema);
    Ok(extrema)
}

/// Clear values that repeat an earlier value in the same column.
fn mask_repeats(extrema: &mut [LocalExtremum]) {
    let mut seen_max: Vec<f64> = Vec::new();
    let mut seen_min: Vec<f64> = Vec::new();

    for extremum in extrema.iter_mut() {
        if let Some(value) = extremum.local_max {
            if seen_max.contains(&value) {
                extremum.local_max = None;
            } else {
                seen_max.push(value);
            }
        }
        if let Some(value) = extremum.local_min {
            if seen_min.contains(&value) {
                extremum.local_min = None;
            } else {
                seen_min.push(value);
            }
        }
    }
}

/// Kept local maxima, in series order.
pub fn maxima(extrema: &[LocalExtremum]) -> Vec<f64> {
    extrema.iter().filter_map(|e| e.local_max).collect()
}

/// Kept local minima, in series order.
pub fn minima(extrema: &[LocalExtremum]) -> Vec<f64> {
    extrema.iter().filter_map(|e| e.local_min).collect()
}

/// Extrema as a `Date`, `Local Max`, `Local Min` frame with nulls for masked values.
pub fn extrema_to_dataframe(extrema: &[LocalExtremum]) -> PolarsResult<DataFrame> {
    let dates: Vec<String> = extrema
        .iter()
        .map(|e| e.date.format("%Y-%m-%d").to_string())
        .collect();
    let highs: Vec<Option<f64>> = extrema.iter().map(|e| e.local_max).collect();
    let lows: Vec<Option<f64>> = extrema.iter().map(|e| e.local_min).collect();

    DataFrame::new(vec![
        Series::new("Date".into(), dates).into(),
        Series::new("Local Max".into(), highs).into(),
        Series::new("Local Min".into(), lows).into(),
    ])
}
