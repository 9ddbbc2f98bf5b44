//! Learned risk scoring
//!
//! Optional regression path: trains a ridge regression on historical
//! engineered rows against realized risk scores, predicts a score for a row,
//! and explains predictions via per-row attribution with a global
//! feature-importance fallback.
//!
//! Every operation here degrades to `None` / empty rather than failing;
//! callers branch on absence and fall back to the heuristic scorer so the two
//! scorers stay interchangeable at every call site.

use crate::capability::Capabilities;
use crate::features::FeatureEngineer;
use crate::heuristic::round3;
use crate::types::{Contributor, DailyMetricsRow, EngineeredRow};
use serde::{Deserialize, Serialize};

/// Candidate feature columns, in contract order. Only candidates actually
/// present in the engineered table make it into a trained model's contract.
pub const CANDIDATE_FEATURES: [&str; 10] = [
    "sleep_debt",
    "resting_hr_bpm",
    "hrv_rmssd_ms",
    "sentiment",
    "workload_index",
    "sleep_hours_z",
    "resting_hr_bpm_z",
    "hrv_rmssd_ms_z",
    "steps_z",
    "sentiment_z",
];

/// Minimum labeled rows required to train
pub const MIN_TRAINING_ROWS: usize = 5;

/// Ridge regularization strength (per sample)
const RIDGE_LAMBDA: f64 = 1e-3;

/// A trained regression model together with its binding feature contract.
///
/// The contract is the ordered feature list the model was trained on; model
/// and contract always travel as one value so they cannot be swapped
/// independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    features: Vec<String>,
    /// Weights over standardized features
    weights: Vec<f64>,
    intercept: f64,
    feature_means: Vec<f64>,
    feature_stds: Vec<f64>,
}

impl TrainedModel {
    /// The ordered feature contract this model expects at inference time.
    pub fn features(&self) -> &[String] {
        &self.features
    }
}

/// Learned scorer over engineered rows
pub struct LearnedScorer;

impl LearnedScorer {
    /// Train a regression model on a raw table.
    ///
    /// Requires the learned-model capability, a `risk_score` ground truth on
    /// at least [`MIN_TRAINING_ROWS`] rows, and a solvable system. Any unmet
    /// condition yields `None`, never an error; callers fall back to the
    /// heuristic scorer.
    pub fn train(table: &[DailyMetricsRow], caps: &Capabilities) -> Option<TrainedModel> {
        if !caps.learned_model {
            return None;
        }

        let engineered = FeatureEngineer::compute(table);
        let features = select_features(&engineered);
        if features.is_empty() {
            return None;
        }

        let matrix = fill_matrix(&engineered, &features);

        // Only labeled rows train the model; the fill above still ran over
        // the full table so forward-fill semantics match prediction time
        let labeled: Vec<(usize, f64)> = engineered
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.raw.risk_score.map(|y| (i, y)))
            .collect();
        if labeled.len() < MIN_TRAINING_ROWS {
            return None;
        }

        let x: Vec<Vec<f64>> = labeled.iter().map(|(i, _)| matrix[*i].clone()).collect();
        let y: Vec<f64> = labeled.iter().map(|(_, y)| *y).collect();

        fit_ridge(&x, &y, features)
    }

    /// Predict a risk score for one engineered row, clamped to [0,1].
    ///
    /// `features` must be the contract returned by the matching `train` call;
    /// mixing models and contracts is undefined and asserted in test builds.
    pub fn predict(
        model: &TrainedModel,
        features: &[String],
        row: &EngineeredRow,
    ) -> Option<f64> {
        debug_assert_eq!(
            features, model.features,
            "feature contract does not match the trained model"
        );
        if features.is_empty() {
            return None;
        }

        let x = fill_row(row, features);
        let mut pred = model.intercept;
        for j in 0..features.len() {
            let z = (x[j] - model.feature_means[j]) / model.feature_stds[j];
            pred += model.weights[j] * z;
        }
        Some(pred.clamp(0.0, 1.0))
    }

    /// Explain a prediction as up to 3 contributors.
    ///
    /// Preferred path scores each feature's local contribution for this
    /// specific row. Without the attribution capability the global importance
    /// of each weight is used instead; those contributors are identical
    /// across rows for a given model, a known fidelity limitation of the
    /// fallback. Weights are normalized so the reported top-3 sum to <= 1.
    pub fn explain(
        model: &TrainedModel,
        features: &[String],
        row: &EngineeredRow,
        caps: &Capabilities,
    ) -> Vec<Contributor> {
        debug_assert_eq!(
            features, model.features,
            "feature contract does not match the trained model"
        );
        if features.is_empty() {
            return Vec::new();
        }

        let magnitudes: Vec<f64> = if caps.attribution {
            let x = fill_row(row, features);
            (0..features.len())
                .map(|j| {
                    let z = (x[j] - model.feature_means[j]) / model.feature_stds[j];
                    (model.weights[j] * z).abs()
                })
                .collect()
        } else {
            model.weights.iter().map(|w| w.abs()).collect()
        };

        let mut ranked: Vec<(usize, f64)> = magnitudes.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(3);

        let total: f64 = ranked.iter().map(|(_, m)| m).sum();
        let total = if total > 0.0 { total } else { 1.0 };

        ranked
            .into_iter()
            .map(|(j, m)| Contributor {
                name: humanize(&features[j]),
                weight: round3(m / total),
            })
            .collect()
    }
}

/// Candidates that actually appear somewhere in the engineered table.
fn select_features(engineered: &[EngineeredRow]) -> Vec<String> {
    CANDIDATE_FEATURES
        .iter()
        .filter(|name| engineered.iter().any(|r| feature_value(r, name).is_some()))
        .map(|name| name.to_string())
        .collect()
}

/// Read one named feature off an engineered row.
fn feature_value(row: &EngineeredRow, name: &str) -> Option<f64> {
    match name {
        "sleep_debt" => Some(row.sleep_debt),
        "resting_hr_bpm" => row.raw.resting_hr_bpm,
        "hrv_rmssd_ms" => row.raw.hrv_rmssd_ms,
        "sentiment" => row.raw.sentiment,
        "workload_index" => Some(row.workload_index),
        "sleep_hours_z" => row.sleep_hours_stats.map(|s| s.z),
        "resting_hr_bpm_z" => row.resting_hr_bpm_stats.map(|s| s.z),
        "hrv_rmssd_ms_z" => row.hrv_rmssd_ms_stats.map(|s| s.z),
        "steps_z" => row.steps_stats.map(|s| s.z),
        "sentiment_z" => row.sentiment_stats.map(|s| s.z),
        _ => None,
    }
}

/// Build the feature matrix: forward-fill each column down the rows, then
/// zero-fill anything still missing at the top.
fn fill_matrix(engineered: &[EngineeredRow], features: &[String]) -> Vec<Vec<f64>> {
    let mut matrix = vec![vec![0.0; features.len()]; engineered.len()];
    for (j, name) in features.iter().enumerate() {
        let mut last: Option<f64> = None;
        for (i, row) in engineered.iter().enumerate() {
            if let Some(v) = feature_value(row, name) {
                last = Some(v);
            }
            matrix[i][j] = last.unwrap_or(0.0);
        }
    }
    matrix
}

/// Re-index one row onto a feature contract. Missing entries forward-fill
/// from the previous feature in contract order, then zero-fill, mirroring
/// how a single row is reindexed at inference time.
fn fill_row(row: &EngineeredRow, features: &[String]) -> Vec<f64> {
    let mut out = Vec::with_capacity(features.len());
    let mut last: Option<f64> = None;
    for name in features {
        if let Some(v) = feature_value(row, name) {
            last = Some(v);
        }
        out.push(last.unwrap_or(0.0));
    }
    out
}

/// Closed-form ridge regression on standardized features.
fn fit_ridge(x: &[Vec<f64>], y: &[f64], features: Vec<String>) -> Option<TrainedModel> {
    let n = x.len();
    let p = features.len();

    // Standardize columns; constant columns get a unit std so they
    // contribute nothing rather than blowing up
    let mut means = vec![0.0; p];
    let mut stds = vec![0.0; p];
    for j in 0..p {
        let mean = x.iter().map(|r| r[j]).sum::<f64>() / n as f64;
        let var = x.iter().map(|r| (r[j] - mean) * (r[j] - mean)).sum::<f64>() / n as f64;
        means[j] = mean;
        stds[j] = var.sqrt().max(1e-9);
    }

    let z: Vec<Vec<f64>> = x
        .iter()
        .map(|r| (0..p).map(|j| (r[j] - means[j]) / stds[j]).collect())
        .collect();

    let y_mean = y.iter().sum::<f64>() / n as f64;

    // Normal equations: (Z'Z + lambda * n * I) w = Z' (y - y_mean)
    let mut a = vec![vec![0.0; p]; p];
    let mut b = vec![0.0; p];
    for j in 0..p {
        for k in 0..p {
            a[j][k] = z.iter().map(|r| r[j] * r[k]).sum();
        }
        a[j][j] += RIDGE_LAMBDA * n as f64;
        b[j] = z.iter().zip(y).map(|(r, yi)| r[j] * (yi - y_mean)).sum();
    }

    let weights = solve(a, b)?;

    Some(TrainedModel {
        features,
        weights,
        intercept: y_mean,
        feature_means: means,
        feature_stds: stds,
    })
}

/// Gaussian elimination with partial pivoting. `None` on a singular system.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in (col + 1)..n {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / a[col][col];
    }
    Some(x)
}

/// Underscores to spaces, title case: "sleep_hours_z" -> "Sleep Hours Z".
fn humanize(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
