//! Heuristic risk scoring
//!
//! Pure scorer mapping one engineered row to a risk score, level, and ranked
//! contributor list using fixed policy weights. This is the universal fallback
//! for the learned scorer: it never fails and never depends on history beyond
//! what is already in the row.

use crate::types::{Contributor, EngineeredRow, RiskLevel, RiskResult};

/// Additive baseline applied before the weighted terms
const BASELINE: f64 = 0.15;

/// Fixed term weights, in declaration order (also the tiebreak order)
const W_SLEEP_DEBT: f64 = 0.28;
const W_RESTING_HR: f64 = 0.20;
const W_HRV_LOW: f64 = 0.22;
const W_SENTIMENT: f64 = 0.15;
const W_WORKLOAD: f64 = 0.20;

/// Neutral defaults for missing signals (a healthy baseline day)
const DEFAULT_RESTING_HR: f64 = 58.0;
const DEFAULT_HRV: f64 = 60.0;
const DEFAULT_SENTIMENT: f64 = 0.0;

/// Heuristic scorer with fixed weights
pub struct HeuristicScorer;

impl HeuristicScorer {
    /// Score one engineered row.
    ///
    /// Five normalized terms, each clamped to [0,1], combine over a 0.15
    /// baseline; the final score clamps to [0,1]. Contributors are the three
    /// largest weighted terms, descending, ties broken by declaration order.
    pub fn score(row: &EngineeredRow) -> RiskResult {
        let rhr = row.raw.resting_hr_bpm.unwrap_or(DEFAULT_RESTING_HR);
        let hrv = row.raw.hrv_rmssd_ms.unwrap_or(DEFAULT_HRV);
        let sentiment = row.raw.sentiment.unwrap_or(DEFAULT_SENTIMENT);

        let sleep_term = (row.sleep_debt / 3.0).clamp(0.0, 1.0);
        let rhr_term = ((rhr - 58.0) / 15.0).clamp(0.0, 1.0);
        let hrv_term = ((60.0 - hrv) / 40.0).clamp(0.0, 1.0);
        let sentiment_term = ((0.0 - sentiment) / 1.2).clamp(0.0, 1.0);
        let workload_term = (row.workload_index / 10.0).clamp(0.0, 1.0);

        let score = (BASELINE
            + W_SLEEP_DEBT * sleep_term
            + W_RESTING_HR * rhr_term
            + W_HRV_LOW * hrv_term
            + W_SENTIMENT * sentiment_term
            + W_WORKLOAD * workload_term)
            .clamp(0.0, 1.0);

        let weighted = [
            ("Sleep debt", W_SLEEP_DEBT * sleep_term),
            ("Resting HR", W_RESTING_HR * rhr_term),
            ("HRV low", W_HRV_LOW * hrv_term),
            ("Sentiment", W_SENTIMENT * sentiment_term),
            ("Workload", W_WORKLOAD * workload_term),
        ];

        // Stable sort keeps declaration order on ties
        let mut ranked = weighted.to_vec();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let contributors = ranked
            .into_iter()
            .take(3)
            .map(|(name, weight)| Contributor {
                name: name.to_string(),
                weight: round3(weight),
            })
            .collect();

        RiskResult {
            score,
            level: RiskLevel::from_score(score),
            contributors,
        }
    }
}

/// Round to 3 decimals, as reported contributor weights and scores are.
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
