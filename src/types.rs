//! Common Types and Constants
//!
//! Shared data structures used across all scoring modules.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Lowest competency score (best known)
pub const MIN_SCORE: f64 = 0.5;

/// Highest competency score (least known)
pub const MAX_SCORE: f64 = 5.5;

/// Width of the score range
pub const SCORE_SPAN: f64 = MAX_SCORE - MIN_SCORE;

/// Neutral score used when the stored value is unusable (NaN)
pub const DEFAULT_SCORE: f64 = 3.0;

/// Scores at or below this are in the easy band
pub const EASY_BAND_MAX: f64 = 2.0;

/// Scores at or above this are in the hard band
pub const HARD_BAND_MIN: f64 = 4.0;

/// Latency above which the user is always considered away (ms)
pub const AWAY_THRESHOLD_MS: f64 = 30_000.0;

/// Milliseconds per hour
pub const MS_PER_HOUR: f64 = 3_600_000.0;

// ==================== Score Helpers ====================

/// Round to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to `places` decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Bring any value back onto the competency scale: NaN falls back to the
/// neutral score, everything else is clamped and rounded to 0.1.
pub fn normalize_score(value: f64) -> f64 {
    let value = if value.is_nan() { DEFAULT_SCORE } else { value };
    round_to_tenth(value.clamp(MIN_SCORE, MAX_SCORE))
}

/// Hours elapsed between `since_ms` and `now_ms`, never negative.
pub fn hours_since(since_ms: i64, now_ms: i64) -> f64 {
    let elapsed = now_ms.saturating_sub(since_ms);
    if elapsed <= 0 {
        0.0
    } else {
        elapsed as f64 / MS_PER_HOUR
    }
}

// ==================== Difficulty Band ====================

/// Coarse difficulty classification of a competency score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyBand {
    Easy,
    Medium,
    Hard,
}

impl DifficultyBand {
    pub fn from_score(score: f64) -> Self {
        if score <= EASY_BAND_MAX {
            DifficultyBand::Easy
        } else if score >= HARD_BAND_MIN {
            DifficultyBand::Hard
        } else {
            DifficultyBand::Medium
        }
    }

    /// Learning-rate multiplier: easy items move faster, hard items slower
    pub fn learning_rate(&self) -> f64 {
        match self {
            DifficultyBand::Easy => 1.2,
            DifficultyBand::Medium => 1.0,
            DifficultyBand::Hard => 0.8,
        }
    }

    /// Base score decrease for a correct answer
    pub fn base_decrement(&self) -> f64 {
        match self {
            DifficultyBand::Easy => 0.8,
            DifficultyBand::Medium => 0.6,
            DifficultyBand::Hard => 0.4,
        }
    }

    /// Base score increase for an incorrect answer
    pub fn base_increment(&self) -> f64 {
        match self {
            DifficultyBand::Easy => 1.2,
            DifficultyBand::Medium => 0.8,
            DifficultyBand::Hard => 0.4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyBand::Easy => "easy",
            DifficultyBand::Medium => "medium",
            DifficultyBand::Hard => "hard",
        }
    }
}

// ==================== History Scope ====================

/// Which events count as "recent" for failure and latency windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryScope {
    /// Every event in the current study session
    #[default]
    Session,
    /// Only events for the item being scored
    Item,
}

impl HistoryScope {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "session" => Some(HistoryScope::Session),
            "item" => Some(HistoryScope::Item),
            _ => None,
        }
    }

    pub fn includes(&self, event: &ResponseEvent, item_id: &str) -> bool {
        match self {
            HistoryScope::Session => true,
            HistoryScope::Item => event.item_id == item_id,
        }
    }
}

// ==================== Response Event ====================

/// One scored answer. Created once by the engine and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEvent {
    pub item_id: String,
    pub is_correct: bool,
    pub timestamp_ms: i64,
    pub response_time_ms: f64,
    pub previous_score: f64,
    pub new_score: f64,
    pub consecutive_correct_global: u32,
    pub consecutive_correct_for_item: u32,
}

impl ResponseEvent {
    pub fn score_delta(&self) -> f64 {
        self.new_score - self.previous_score
    }
}

/// Last `window` events that fall into `scope` for `item_id`, oldest first.
pub fn scoped_window<'a>(
    events: &'a [ResponseEvent],
    scope: HistoryScope,
    item_id: &str,
    window: usize,
) -> Vec<&'a ResponseEvent> {
    let mut picked: Vec<&ResponseEvent> = events
        .iter()
        .rev()
        .filter(|e| scope.includes(e, item_id))
        .take(window)
        .collect();
    picked.reverse();
    picked
}
