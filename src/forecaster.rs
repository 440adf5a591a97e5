use rand::Rng;
use crate::history::History;
use crate::models::observation::Reading;

/// Number of most recent observations a trend is fitted over
pub const WINDOW_SIZE: usize = 20;

/// Fewer observations than this and the forecast falls back to a jittered copy of the last value
pub const MIN_TREND_POINTS: usize = 5;

/// Forecasts the next PM2.5 value for the city of the current reading, using the city's history
/// with the current reading logically appended
///
/// # Arguments
///
/// * 'history' - all observations loaded for this cycle
/// * 'current' - the reading just fetched, not yet part of history
/// * 'rng' - random source for the cold start jitter
pub fn forecast<R: Rng + ?Sized>(history: &History, current: &Reading, rng: &mut R) -> f64 {
    let series = history.pm2_5_series(&current.city, Some(current.pm2_5), WINDOW_SIZE);
    predict_next(&series, rng)
}

/// Predicts the next value of a series of PM2.5 values in arrival order.
///
/// Only the last WINDOW_SIZE values are used. With fewer than MIN_TREND_POINTS values the last
/// value is scaled by a uniform factor in [0.9, 1.1]. Otherwise a least squares line is fitted
/// against positions 0..n-1 and evaluated at position n + 1.
/// The result is never negative, and an empty series predicts 0.0.
///
/// # Arguments
///
/// * 'series' - PM2.5 values, oldest first
/// * 'rng' - random source for the cold start jitter
pub fn predict_next<R: Rng + ?Sized>(series: &[f64], rng: &mut R) -> f64 {
    let window = &series[series.len().saturating_sub(WINDOW_SIZE)..];

    let prediction = match window.last() {
        None => 0.0,
        Some(last) if window.len() < MIN_TREND_POINTS => last * rng.random_range(0.9..=1.1),
        Some(_) => {
            let (slope, intercept) = fit_line(window);
            intercept + slope * (window.len() + 1) as f64
        }
    };

    if prediction.is_finite() { prediction.max(0.0) } else { 0.0 }
}

/// Ordinary least squares fit of y against x = 0..n-1, returns (slope, intercept)
///
/// # Arguments
///
/// * 'ys' - observed values, at least one
fn fit_line(ys: &[f64]) -> (f64, f64) {
    let n = ys.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (sxy, sxx) = ys.iter().enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, y)| {
            let dx = i as f64 - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    (slope, mean_y - slope * mean_x)
}
