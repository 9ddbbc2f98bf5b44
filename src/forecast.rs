//! Risk forecasting
//!
//! Short-horizon projection of future risk scores from a per-date score
//! series. The preferred tier fits an additive trend + weekly seasonality
//! model over the full history; when that tier is unavailable or the fit
//! degenerates, a single exponential smoothing over the trailing week with a
//! fixed decay schedule takes over. Neither tier ever surfaces an error.

use crate::capability::Capabilities;
use crate::heuristic::round3;
use crate::types::ScorePoint;
use chrono::Datelike;

/// Default forecast horizon in days
pub const DEFAULT_HORIZON: usize = 3;

/// Smoothing factor for the fallback tier
const SMOOTHING_ALPHA: f64 = 0.5;

/// Trailing window the fallback smooths over
const SMOOTHING_WINDOW: usize = 7;

/// Minimum history for the trend tier
const MIN_TREND_POINTS: usize = 8;

/// Fixed decay multipliers for fallback projection steps 1..=3
const DECAY_SCHEDULE: [f64; 3] = [0.95, 0.92, 0.90];

/// Per-step decay ratio used to extend the schedule past step 3
const DECAY_EXTENSION_RATIO: f64 = 0.98;

/// Forecaster over daily risk score series
pub struct Forecaster;

impl Forecaster {
    /// Forecast `horizon` future scores from an ordered-by-date history.
    ///
    /// Empty history yields an empty forecast. Otherwise the result has
    /// exactly `horizon` values, each in [0,1] and rounded to 3 decimals.
    pub fn forecast(history: &[ScorePoint], horizon: usize, caps: &Capabilities) -> Vec<f64> {
        if history.is_empty() || horizon == 0 {
            return Vec::new();
        }

        if caps.trend_forecast {
            if let Some(forecast) = trend_forecast(history, horizon) {
                return forecast;
            }
        }

        smoothing_forecast(history, horizon)
    }
}

/// Additive trend + weekly seasonality fit.
///
/// Linear trend by least squares over day offsets; seasonal terms are mean
/// residuals per weekday. `None` when history is too short or the time axis
/// is degenerate, which sends the caller to the smoothing tier.
fn trend_forecast(history: &[ScorePoint], horizon: usize) -> Option<Vec<f64>> {
    if history.len() < MIN_TREND_POINTS {
        return None;
    }

    let first = history.first()?.date;
    let last = history.last()?.date;

    let t: Vec<f64> = history
        .iter()
        .map(|p| (p.date - first).num_days() as f64)
        .collect();
    let y: Vec<f64> = history.iter().map(|p| p.score).collect();
    let n = history.len() as f64;

    let t_mean = t.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..history.len() {
        num += (t[i] - t_mean) * (y[i] - y_mean);
        den += (t[i] - t_mean) * (t[i] - t_mean);
    }
    if den < 1e-12 {
        return None;
    }
    let slope = num / den;
    let intercept = y_mean - slope * t_mean;

    // Weekly seasonality: mean residual per weekday, zero where unobserved
    let mut seasonal_sum = [0.0; 7];
    let mut seasonal_count = [0usize; 7];
    for (i, point) in history.iter().enumerate() {
        let weekday = point.date.weekday().num_days_from_monday() as usize;
        let residual = y[i] - (intercept + slope * t[i]);
        seasonal_sum[weekday] += residual;
        seasonal_count[weekday] += 1;
    }
    let seasonal: Vec<f64> = (0..7)
        .map(|w| {
            if seasonal_count[w] > 0 {
                seasonal_sum[w] / seasonal_count[w] as f64
            } else {
                0.0
            }
        })
        .collect();

    let last_t = (last - first).num_days() as f64;
    let mut out = Vec::with_capacity(horizon);
    for step in 1..=horizon {
        let date = last + chrono::Duration::days(step as i64);
        let weekday = date.weekday().num_days_from_monday() as usize;
        let yhat = intercept + slope * (last_t + step as f64) + seasonal[weekday];
        out.push(round3(yhat.clamp(0.0, 1.0)));
    }
    Some(out)
}

/// Single exponential smoothing over the trailing week, projected forward
/// with the fixed decay schedule.
fn smoothing_forecast(history: &[ScorePoint], horizon: usize) -> Vec<f64> {
    let start = history.len().saturating_sub(SMOOTHING_WINDOW);
    let window = &history[start..];

    let mut level = window[0].score;
    for point in &window[1..] {
        level = SMOOTHING_ALPHA * point.score + (1.0 - SMOOTHING_ALPHA) * level;
    }

    (1..=horizon)
        .map(|step| round3(level * decay_multiplier(step)))
        .collect()
}

/// Decay multiplier per projection step. Steps 1..=3 use the fixed schedule;
/// later steps extend it geometrically.
fn decay_multiplier(step: usize) -> f64 {
    match step {
        0 => 1.0,
        1..=3 => DECAY_SCHEDULE[step - 1],
        _ => {
            DECAY_SCHEDULE[2] * DECAY_EXTENSION_RATIO.powi((step - DECAY_SCHEDULE.len()) as i32)
        }
    }
}
