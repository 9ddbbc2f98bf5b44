//! Core types for the PreBurn pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw daily metrics, engineered rows, risk results, and report output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of raw wearable and behavioral signals.
///
/// All signal fields are optional; a missing field degrades to a documented
/// default downstream rather than propagating nulls into the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricsRow {
    /// Calendar date (unique per row, ascending sort key)
    pub date: NaiveDate,
    /// Total sleep duration (hours)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    /// Resting heart rate (bpm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resting_hr_bpm: Option<f64>,
    /// Heart rate variability (ms, RMSSD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrv_rmssd_ms: Option<f64>,
    /// Step count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<f64>,
    /// Sentiment score (roughly -1..1, negative = worse)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
    /// Total meeting time (minutes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_minutes: Option<f64>,
    /// Number of meetings outside working hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_hours_meetings: Option<f64>,
    /// Precomputed workload index; derived from meetings when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_index: Option<f64>,
    /// Ground-truth risk score, used only for training
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
}

impl DailyMetricsRow {
    /// Create an empty row for a date; useful as a fixture base.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sleep_hours: None,
            resting_hr_bpm: None,
            hrv_rmssd_ms: None,
            steps: None,
            sentiment: None,
            meeting_minutes: None,
            after_hours_meetings: None,
            workload_index: None,
            risk_score: None,
        }
    }
}

/// Trailing-window rolling statistics for one signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    /// Trailing 7-sample mean
    pub mean7: f64,
    /// Trailing 7-sample standard deviation (sample, n-1)
    pub std7: f64,
    /// Standardized deviation: (value - mean7) / (std7 + epsilon)
    pub z: f64,
}

/// A raw row enriched with rolling baselines, z-scores, and derived indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineeredRow {
    /// Source raw metrics
    pub raw: DailyMetricsRow,
    /// Rolling stats per signal; absent before the minimum window is reached
    /// or when the signal itself is missing for the day
    pub sleep_hours_stats: Option<RollingStats>,
    pub resting_hr_bpm_stats: Option<RollingStats>,
    pub hrv_rmssd_ms_stats: Option<RollingStats>,
    pub steps_stats: Option<RollingStats>,
    pub sentiment_stats: Option<RollingStats>,
    pub meeting_minutes_stats: Option<RollingStats>,
    /// Shortfall of sleep below the 7.5h reference, floored at 0
    pub sleep_debt: f64,
    /// Composite meeting load (meeting_minutes/60 + 0.5 * after_hours_meetings)
    pub workload_index: f64,
}

/// Risk level derived from the score thresholds.
///
/// The thresholds live here and nowhere else; both scorers go through
/// [`RiskLevel::from_score`] so they can never diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Map a score in [0,1] to a level: <0.33 Low, <0.66 Medium, else High.
    pub fn from_score(score: f64) -> Self {
        if score < 0.33 {
            RiskLevel::Low
        } else if score < 0.66 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// A named scoring term with its weighted magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    pub weight: f64,
}

/// Scored risk for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Risk score in [0,1]
    pub score: f64,
    /// Level from the shared thresholds
    pub level: RiskLevel,
    /// Up to 3 contributors, largest weight first
    pub contributors: Vec<Contributor>,
}

/// One point of the per-date risk score series consumed by the forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub date: NaiveDate,
    pub score: f64,
}

/// A dated risk result, as produced for history and report output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRisk {
    pub date: NaiveDate,
    pub result: RiskResult,
}

/// Which scorer produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoredBy {
    Learned,
    Heuristic,
}

impl ScoredBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoredBy::Learned => "learned",
            ScoredBy::Heuristic => "heuristic",
        }
    }
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report provenance information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub computed_at_utc: String,
    pub rows_observed: usize,
    pub scored_by: String,
}

/// Complete risk report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub daily: DailyRisk,
    pub forecast: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.329), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.33), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.659), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.66), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::High);
    }

    #[test]
    fn test_row_deserialization_with_missing_fields() {
        let json = r#"{"date": "2024-03-01", "sleep_hours": 6.5, "steps": 4200}"#;
        let row: DailyMetricsRow = serde_json::from_str(json).unwrap();

        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(row.sleep_hours, Some(6.5));
        assert_eq!(row.steps, Some(4200.0));
        assert_eq!(row.resting_hr_bpm, None);
        assert_eq!(row.risk_score, None);
    }

    #[test]
    fn test_row_serialization_skips_absent_fields() {
        let row = DailyMetricsRow::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"date":"2024-03-01"}"#);
    }
}
