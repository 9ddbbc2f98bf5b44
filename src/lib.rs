//! PreBurn - Burnout risk engine for daily wearable and behavioral metrics
//!
//! PreBurn estimates a daily burnout risk score from sleep, heart, activity,
//! sentiment, and meeting-load signals through a deterministic pipeline:
//! feature engineering → scoring → explanation → forecasting.
//!
//! ## Fallback tiers
//!
//! - **Scoring**: learned regression model when trained, heuristic weights otherwise
//! - **Explanation**: per-row attribution, global feature importance, empty
//! - **Forecasting**: trend + weekly seasonality, exponential smoothing with decay
//!
//! Every tier degrades silently to the next; no public operation raises from
//! inside the core.

pub mod capability;
pub mod error;
pub mod features;
pub mod forecast;
pub mod heuristic;
pub mod learned;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod types;

pub use capability::Capabilities;
pub use error::EngineError;
pub use features::FeatureEngineer;
pub use forecast::Forecaster;
pub use heuristic::HeuristicScorer;
pub use learned::{LearnedScorer, TrainedModel};
pub use pipeline::RiskEngine;
pub use registry::ModelRegistry;
pub use report::ReportEncoder;
pub use types::{
    Contributor, DailyMetricsRow, DailyRisk, EngineeredRow, RiskLevel, RiskReport, RiskResult,
    ScorePoint, ScoredBy,
};

/// Engine version embedded in all report payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "preburn";
