//! Report encoding
//!
//! Encodes engine output into a versioned risk report payload for the
//! transport layer. Scores and forecast values are rounded to 3 decimals
//! here, at the boundary, so the core keeps full precision.

use crate::error::EngineError;
use crate::heuristic::round3;
use crate::pipeline::RiskEngine;
use crate::types::{DailyRisk, ReportProducer, ReportProvenance, RiskReport};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for producing risk report payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode the engine's latest risk and default-horizon forecast.
    ///
    /// Fails only when the engine holds no data at all.
    pub fn encode(&self, engine: &RiskEngine) -> Result<RiskReport, EngineError> {
        let (daily, scored_by) = engine.latest_risk().ok_or_else(|| {
            EngineError::EmptyTable("no rows loaded; nothing to report".to_string())
        })?;

        let daily = DailyRisk {
            date: daily.date,
            result: crate::types::RiskResult {
                score: round3(daily.result.score),
                ..daily.result
            },
        };

        Ok(RiskReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            provenance: ReportProvenance {
                computed_at_utc: Utc::now().to_rfc3339(),
                rows_observed: engine.table().len(),
                scored_by: scored_by.as_str().to_string(),
            },
            daily,
            forecast: engine.forecast_default(),
        })
    }

    /// Encode to a JSON string
    pub fn encode_to_json(&self, engine: &RiskEngine) -> Result<String, EngineError> {
        let report = self.encode(engine)?;
        serde_json::to_string_pretty(&report).map_err(EngineError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DailyMetricsRow;
    use chrono::NaiveDate;

    fn make_engine() -> RiskEngine {
        let table: Vec<DailyMetricsRow> = (1..=10)
            .map(|d| DailyMetricsRow {
                sleep_hours: Some(6.0),
                resting_hr_bpm: Some(62.0),
                hrv_rmssd_ms: Some(48.0),
                ..DailyMetricsRow::new(NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
            })
            .collect();
        let mut engine = RiskEngine::new();
        engine.load_table(table);
        engine
    }

    #[test]
    fn test_encode_report() {
        let engine = make_engine();
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(&engine).unwrap();

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.version, ENGINE_VERSION);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.provenance.rows_observed, 10);
        assert_eq!(report.provenance.scored_by, "heuristic");
        assert_eq!(report.daily.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(report.forecast.len(), 3);

        // Boundary rounding: reported score carries 3 decimals
        assert_eq!(report.daily.result.score, round3(report.daily.result.score));
    }

    #[test]
    fn test_encode_empty_engine_fails() {
        let engine = RiskEngine::new();
        let encoder = ReportEncoder::new();
        assert!(encoder.encode(&engine).is_err());
    }

    #[test]
    fn test_encode_to_json() {
        let engine = make_engine();
        let encoder = ReportEncoder::new();
        let json = encoder.encode_to_json(&engine).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("report_version").is_some());
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("provenance").is_some());
        assert!(parsed.get("daily").is_some());
        assert!(parsed.get("forecast").is_some());
    }
}
