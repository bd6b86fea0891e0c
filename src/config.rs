//! Engine configuration
//!
//! Only the windowing behaviour is configurable; the scoring coefficients
//! are fixed constants in their modules.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};
use crate::types::HistoryScope;

const DEFAULT_HISTORY_WINDOW: usize = 10;
const DEFAULT_FAILURE_WINDOW: usize = 5;
const MAX_WINDOW: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringConfig {
    /// Whether recent windows look at the whole session or only the scored item
    pub history_scope: HistoryScope,
    /// Number of recent response times kept for latency smoothing
    pub history_window: usize,
    /// Number of recent events inspected for the failure penalty
    pub failure_window: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            history_scope: HistoryScope::Session,
            history_window: DEFAULT_HISTORY_WINDOW,
            failure_window: DEFAULT_FAILURE_WINDOW,
        }
    }
}

impl ScoringConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SCORING_HISTORY_SCOPE") {
            match HistoryScope::from_str(&val) {
                Some(scope) => config.history_scope = scope,
                None => {
                    tracing::warn!(value = %val, "Unknown SCORING_HISTORY_SCOPE, keeping default")
                }
            }
        }
        if let Ok(val) = std::env::var("SCORING_HISTORY_WINDOW") {
            config.history_window = val.parse().unwrap_or(DEFAULT_HISTORY_WINDOW);
        }
        if let Ok(val) = std::env::var("SCORING_FAILURE_WINDOW") {
            config.failure_window = val.parse().unwrap_or(DEFAULT_FAILURE_WINDOW);
        }

        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "Scoring config from env rejected, using defaults");
            return Self::default();
        }

        config
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_window == 0 || self.history_window > MAX_WINDOW {
            return Err(ScoringError::InvalidConfig(format!(
                "historyWindow must be in 1..={MAX_WINDOW}, got {}",
                self.history_window
            )));
        }
        if self.failure_window == 0 || self.failure_window > MAX_WINDOW {
            return Err(ScoringError::InvalidConfig(format!(
                "failureWindow must be in 1..={MAX_WINDOW}, got {}",
                self.failure_window
            )));
        }
        Ok(())
    }
}
