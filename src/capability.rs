//! Optional capability boundary
//!
//! The learned scorer, its local attribution, and the trend forecaster are
//! optional tiers in the original runtime. Availability is decided once, here,
//! rather than scattered through the scoring logic; flipping a flag off forces
//! the corresponding fallback tier (heuristic scorer, global feature
//! importance, exponential smoothing), which the tests use to pin both sides
//! of every fallback chain.

use serde::{Deserialize, Serialize};

/// Which optional computation tiers are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Regression training/inference for the learned scorer
    pub learned_model: bool,
    /// Per-row local attribution for learned-model explanations
    pub attribution: bool,
    /// Trend + seasonality model for forecasting
    pub trend_forecast: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            learned_model: true,
            attribution: true,
            trend_forecast: true,
        }
    }
}

impl Capabilities {
    /// Everything available (the normal runtime).
    pub fn all() -> Self {
        Self::default()
    }

    /// Every optional tier disabled; only heuristic scoring and smoothing
    /// forecasts remain.
    pub fn none() -> Self {
        Self {
            learned_model: false,
            attribution: false,
            trend_forecast: false,
        }
    }
}
