//! Pipeline orchestration
//!
//! This module provides the public API of the PreBurn engine. It owns the
//! raw metrics table, keeps the trained model in a registry, and wires the
//! learned-then-heuristic fallback through scoring, history, and forecasting.

use crate::capability::Capabilities;
use crate::features::FeatureEngineer;
use crate::forecast::{Forecaster, DEFAULT_HORIZON};
use crate::heuristic::HeuristicScorer;
use crate::learned::{LearnedScorer, TrainedModel};
use crate::registry::ModelRegistry;
use crate::types::{
    DailyMetricsRow, DailyRisk, EngineeredRow, RiskLevel, RiskResult, ScorePoint, ScoredBy,
};
/// Stateful risk engine over a wholesale-replaced metrics table.
///
/// Tables are swapped, never merged; every swap retrains synchronously and
/// replaces the model/contract pair atomically. All reads derive the
/// engineered table fresh from the current raw table.
pub struct RiskEngine {
    table: Vec<DailyMetricsRow>,
    registry: ModelRegistry,
    capabilities: Capabilities,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskEngine {
    /// Create an empty engine with every capability tier available.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::all())
    }

    /// Create an engine with a specific capability set.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            table: Vec::new(),
            registry: ModelRegistry::new(),
            capabilities,
        }
    }

    /// Replace the metrics table wholesale and retrain.
    ///
    /// Training that degrades (no labels, too few rows, capability off)
    /// clears the model, which puts every caller on the heuristic path.
    pub fn load_table(&mut self, rows: Vec<DailyMetricsRow>) {
        self.table = rows;
        self.registry
            .replace(LearnedScorer::train(&self.table, &self.capabilities));
    }

    /// The current raw table.
    pub fn table(&self) -> &[DailyMetricsRow] {
        &self.table
    }

    /// Whether a trained model is currently active.
    pub fn has_model(&self) -> bool {
        self.registry.current().is_some()
    }

    /// Risk for the most recent day, with the scorer that produced it.
    pub fn latest_risk(&self) -> Option<(DailyRisk, ScoredBy)> {
        let engineered = FeatureEngineer::compute(&self.table);
        let row = engineered.last()?;
        let model = self.registry.current();
        let (result, scored_by) = self.score_row(model.as_deref(), row);
        Some((
            DailyRisk {
                date: row.raw.date,
                result,
            },
            scored_by,
        ))
    }

    /// Risk for every day of history, ascending by date.
    pub fn history(&self) -> Vec<DailyRisk> {
        let engineered = FeatureEngineer::compute(&self.table);
        let model = self.registry.current();
        engineered
            .iter()
            .map(|row| {
                let (result, _) = self.score_row(model.as_deref(), row);
                DailyRisk {
                    date: row.raw.date,
                    result,
                }
            })
            .collect()
    }

    /// Forecast risk for the next `horizon` days (see [`DEFAULT_HORIZON`]).
    pub fn forecast_risk(&self, horizon: usize) -> Vec<f64> {
        let series: Vec<ScorePoint> = self
            .history()
            .iter()
            .map(|d| ScorePoint {
                date: d.date,
                score: d.result.score,
            })
            .collect();
        Forecaster::forecast(&series, horizon, &self.capabilities)
    }

    /// Forecast with the default horizon.
    pub fn forecast_default(&self) -> Vec<f64> {
        self.forecast_risk(DEFAULT_HORIZON)
    }

    /// Score one row: learned model first, heuristic as the universal
    /// fallback. Both paths share the same result shape and thresholds.
    fn score_row(
        &self,
        model: Option<&TrainedModel>,
        row: &EngineeredRow,
    ) -> (RiskResult, ScoredBy) {
        if let Some(model) = model {
            let contract = model.features().to_vec();
            if let Some(score) = LearnedScorer::predict(model, &contract, row) {
                let contributors =
                    LearnedScorer::explain(model, &contract, row, &self.capabilities);
                return (
                    RiskResult {
                        score,
                        level: RiskLevel::from_score(score),
                        contributors,
                    },
                    ScoredBy::Learned,
                );
            }
        }
        (HeuristicScorer::score(row), ScoredBy::Heuristic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn unlabeled_table(days: u32) -> Vec<DailyMetricsRow> {
        (1..=days)
            .map(|d| DailyMetricsRow {
                sleep_hours: Some(5.5 + (d % 3) as f64 * 0.5),
                resting_hr_bpm: Some(56.0 + (d % 4) as f64),
                hrv_rmssd_ms: Some(58.0 - (d % 5) as f64),
                sentiment: Some(0.1 - (d % 3) as f64 * 0.2),
                meeting_minutes: Some(240.0 + (d % 2) as f64 * 120.0),
                ..DailyMetricsRow::new(date(d))
            })
            .collect()
    }

    fn labeled_table(days: u32) -> Vec<DailyMetricsRow> {
        unlabeled_table(days)
            .into_iter()
            .map(|mut row| {
                let debt = (7.5 - row.sleep_hours.unwrap()).max(0.0);
                row.risk_score = Some((0.2 + 0.15 * debt).min(1.0));
                row
            })
            .collect()
    }

    #[test]
    fn test_empty_engine() {
        let engine = RiskEngine::new();
        assert!(engine.latest_risk().is_none());
        assert!(engine.history().is_empty());
        assert!(engine.forecast_default().is_empty());
        assert!(!engine.has_model());
    }

    #[test]
    fn test_unlabeled_table_uses_heuristic() {
        let mut engine = RiskEngine::new();
        engine.load_table(unlabeled_table(10));

        assert!(!engine.has_model());
        let (daily, scored_by) = engine.latest_risk().unwrap();
        assert_eq!(scored_by, ScoredBy::Heuristic);
        assert_eq!(daily.date, date(10));
        assert!((0.0..=1.0).contains(&daily.result.score));
        assert_eq!(daily.result.contributors.len(), 3);
    }

    #[test]
    fn test_labeled_table_uses_learned_model() {
        let mut engine = RiskEngine::new();
        engine.load_table(labeled_table(14));

        assert!(engine.has_model());
        let (daily, scored_by) = engine.latest_risk().unwrap();
        assert_eq!(scored_by, ScoredBy::Learned);
        assert!((0.0..=1.0).contains(&daily.result.score));
        assert_eq!(daily.result.level, RiskLevel::from_score(daily.result.score));
    }

    #[test]
    fn test_capability_off_forces_heuristic() {
        let mut engine = RiskEngine::with_capabilities(Capabilities::none());
        engine.load_table(labeled_table(14));

        assert!(!engine.has_model());
        let (_, scored_by) = engine.latest_risk().unwrap();
        assert_eq!(scored_by, ScoredBy::Heuristic);
    }

    #[test]
    fn test_history_is_ascending_and_complete() {
        let mut table = unlabeled_table(10);
        table.reverse(); // engine must sort, not trust input order
        let mut engine = RiskEngine::new();
        engine.load_table(table);

        let history = engine.history();
        assert_eq!(history.len(), 10);
        let dates: Vec<NaiveDate> = history.iter().map(|d| d.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_forecast_has_requested_horizon() {
        let mut engine = RiskEngine::new();
        engine.load_table(unlabeled_table(14));

        assert_eq!(engine.forecast_default().len(), DEFAULT_HORIZON);
        assert_eq!(engine.forecast_risk(5).len(), 5);
        for value in engine.forecast_risk(5) {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_reload_without_labels_clears_model() {
        let mut engine = RiskEngine::new();
        engine.load_table(labeled_table(14));
        assert!(engine.has_model());

        engine.load_table(unlabeled_table(10));
        assert!(!engine.has_model());
        let (_, scored_by) = engine.latest_risk().unwrap();
        assert_eq!(scored_by, ScoredBy::Heuristic);
    }

    #[test]
    fn test_scorers_share_result_shape() {
        // Learned and heuristic results must be interchangeable: same score
        // range, same threshold mapping, at most 3 contributors
        let mut learned = RiskEngine::new();
        learned.load_table(labeled_table(14));
        let mut heuristic = RiskEngine::new();
        heuristic.load_table(unlabeled_table(14));

        for engine in [&learned, &heuristic] {
            let (daily, _) = engine.latest_risk().unwrap();
            assert!((0.0..=1.0).contains(&daily.result.score));
            assert_eq!(daily.result.level, RiskLevel::from_score(daily.result.score));
            assert!(daily.result.contributors.len() <= 3);
        }
    }
}
