//! Window size search for local-extrema smoothing.
//!
//! Each candidate window is scored by the spread of the extrema it keeps:
//! sample variance of the local maxima plus sample variance of the local
//! minima. The smallest total wins.

use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use tracing::{debug, info};

use super::local::{find_local_extrema, maxima, minima, ExtremaError};
use crate::data::PriceSeries;

/// Score of one candidate window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowScore {
    pub window: usize,
    pub maxima: usize,
    pub minima: usize,
    /// `None` when either column has fewer than two values.
    pub total_variance: Option<f64>,
}

/// Outcome of a window search.
#[derive(Debug, Clone, Serialize)]
pub struct WindowSelection {
    pub window: usize,
    pub total_variance: Option<f64>,
    pub scores: Vec<WindowScore>,
}

fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let variance = Statistics::variance(values);
    variance.is_finite().then_some(variance)
}

/// Score a single window size.
pub fn score_window(series: &PriceSeries, window: usize) -> Result<WindowScore, ExtremaError> {
    let extrema = find_local_extrema(series, window)?;
    let highs = maxima(&extrema);
    let lows = minima(&extrema);

    let total_variance = match (sample_variance(&highs), sample_variance(&lows)) {
        (Some(high), Some(low)) => Some(high + low),
        _ => None,
    };

    debug!(
        "window {}: {} maxima, {} minima, total variance {:?}",
        window,
        highs.len(),
        lows.len(),
        total_variance
    );

    Ok(WindowScore {
        window,
        maxima: highs.len(),
        minima: lows.len(),
        total_variance,
    })
}

/// Search `min_window..=max_window` for the window with the lowest total
/// variance. Ties go to the smaller window; when no window has a defined
/// score, `min_window` is returned.
pub fn find_optimal_window_size(
    series: &PriceSeries,
    min_window: usize,
    max_window: usize,
) -> Result<WindowSelection, ExtremaError> {
    if min_window == 0 {
        return Err(ExtremaError::ZeroWindow);
    }
    if min_window > max_window {
        return Err(ExtremaError::InvalidRange {
            min: min_window,
            max: max_window,
        });
    }
    if max_window > series.len() {
        return Err(ExtremaError::WindowTooLarge {
            window: max_window,
            len: series.len(),
        });
    }

    // Indexed parallel collect keeps window order
    let scores: Vec<WindowScore> = (min_window..=max_window)
        .into_par_iter()
        .map(|window| score_window(series, window))
        .collect::<Result<_, _>>()?;

    let mut best: Option<(usize, f64)> = None;
    for score in &scores {
        if let Some(total) = score.total_variance {
            if best.map_or(true, |(_, current)| total < current) {
                best = Some((score.window, total));
            }
        }
    }

    let (window, total_variance) = match best {
        Some((window, total)) => (window, Some(total)),
        None => (min_window, None),
    };

    info!(
        "{}: optimal window {} of {}..={} (total variance {:?})",
        series.symbol, window, min_window, max_window, total_variance
    );

    Ok(WindowSelection {
        window,
        total_variance,
        scores,
    })
}
