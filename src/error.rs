//! Error types for the anofox-anomaly library.

use thiserror::Error;

/// Result type alias for anomaly detection operations.
pub type Result<T> = std::result::Result<T, AnomalyError>;

/// Errors that can occur during anomaly detection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnomalyError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
