//! Error types
//!
//! Numeric scoring never fails; only level conversion and configuration
//! loading have error paths.

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("invalid display level: {0} (expected 1-5)")]
    InvalidLevel(u8),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
