//! Error types for PreBurn
//!
//! These cover the ingest/encode boundary only. Pipeline operations degrade
//! to absent/empty results instead of failing; see the module docs on
//! [`crate::learned`] and [`crate::forecast`].

use thiserror::Error;

/// Errors that can occur at the engine boundary
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse metrics table: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Empty metrics table: {0}")]
    EmptyTable(String),
}
