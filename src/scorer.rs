//! Competency Score Update
//!
//! Core theory:
//! - Every item carries a continuous score in [0.5, 5.5]; lower is better known
//! - A correct answer lowers the score, an incorrect one raises it
//! - The step size is scaled by several independent factors
//!
//! Formulas:
//! - Correct:   Δ = -(base + mastery) · lr · time · timing · word
//! - Incorrect: Δ = +base · (1 + failure) · lr · time · timing
//!   - base / lr: from the difficulty band of the current score
//!   - time = 1 + 0.3 · min(hours / 24, 1), stale items move further
//!   - timing = 1 + bonus - penalty, from response time / baseline ratio
//!   - word = min(1.8^item_streak, 5), same item correct in a row
//!   - failure = min(0.2 · recent failures, 1)
//!
//! The result is clamped to [0.5, 5.5] and rounded to 0.1. Every
//! intermediate factor is returned in [`ScoreDiagnostics`].

use serde::{Deserialize, Serialize};

use crate::sanitize::{sanitize_average, sanitize_latency, sanitize_score};
use crate::types::{
    hours_since, normalize_score, scoped_window, DifficultyBand, HistoryScope, ResponseEvent,
};

// ==================== Constants ====================

/// Maximum extra weight for items not reviewed recently
const RECENCY_WEIGHT: f64 = 0.3;

/// Hours after which the recency factor saturates
const RECENCY_SATURATION_HOURS: f64 = 24.0;

/// Extra decrement for items already at the bottom of the scale
const MASTERY_BONUS: f64 = 0.2;

/// Scores at or below this receive the mastery bonus
const MASTERY_SCORE_MAX: f64 = 1.0;

/// Per-item streak growth base
const WORD_STREAK_BASE: f64 = 1.8;

/// Per-item streak bonus ceiling
const WORD_STREAK_CAP: f64 = 5.0;

/// Failure penalty per recent incorrect answer
const FAILURE_STEP: f64 = 0.2;

/// Failure penalty ceiling
const FAILURE_CAP: f64 = 1.0;

/// Timing bonus growth per global streak step
const GLOBAL_STREAK_STEP: f64 = 0.05;

// ==================== Data Structures ====================

/// Everything the scorer needs for one response
#[derive(Debug, Clone)]
pub struct ScoreInput<'a> {
    pub current_score: f64,
    pub is_correct: bool,
    /// Correct answers in a row across the session, before this response
    pub consecutive_correct_global: u32,
    /// Correct answers in a row on this item, before this response
    pub consecutive_correct_for_item: u32,
    pub last_reviewed_at_ms: Option<i64>,
    pub now_ms: i64,
    /// Recent events; every incorrect one counts toward the failure penalty
    pub recent_events: &'a [ResponseEvent],
    pub response_time_ms: Option<f64>,
    pub avg_response_time_ms: Option<f64>,
    pub is_away: bool,
}

impl<'a> ScoreInput<'a> {
    /// Minimal input: no timing, recency or history data.
    pub fn new(current_score: f64, is_correct: bool, now_ms: i64) -> Self {
        Self {
            current_score,
            is_correct,
            consecutive_correct_global: 0,
            consecutive_correct_for_item: 0,
            last_reviewed_at_ms: None,
            now_ms,
            recent_events: &[],
            response_time_ms: None,
            avg_response_time_ms: None,
            is_away: false,
        }
    }
}

/// Breakdown of a single update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDiagnostics {
    pub band: DifficultyBand,
    pub learning_rate: f64,
    pub hours_since_review: Option<f64>,
    pub time_factor: f64,
    /// response time / baseline, when both were available
    pub response_ratio: Option<f64>,
    pub is_away: bool,
    pub timing_bonus: f64,
    pub timing_penalty: f64,
    pub timing_factor: f64,
    pub word_bonus: f64,
    pub mastery_bonus: f64,
    pub recent_failures: u32,
    pub failure_penalty: f64,
    pub base_step: f64,
    /// Signed change before clamping (negative for correct answers)
    pub total_step: f64,
    pub raw_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    pub new_score: f64,
    pub diagnostics: ScoreDiagnostics,
}

/// Timing bonus / penalty for one response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingAdjustment {
    pub bonus: f64,
    pub penalty: f64,
}

impl TimingAdjustment {
    pub const NEUTRAL: TimingAdjustment = TimingAdjustment {
        bonus: 0.0,
        penalty: 0.0,
    };

    pub fn factor(&self) -> f64 {
        1.0 + self.bonus - self.penalty
    }
}

// ==================== Factors ====================

/// 时间间隔因子：越久未复习，奖惩幅度越大
pub fn time_factor(hours_since_review: Option<f64>) -> f64 {
    match hours_since_review {
        Some(hours) if hours.is_finite() && hours > 0.0 => {
            1.0 + RECENCY_WEIGHT * (hours / RECENCY_SATURATION_HOURS).min(1.0)
        }
        _ => 1.0,
    }
}

/// 单词连续答对奖励
pub fn word_bonus(consecutive_correct_for_item: u32) -> f64 {
    let exponent = consecutive_correct_for_item.min(i32::MAX as u32) as i32;
    WORD_STREAK_BASE.powi(exponent).min(WORD_STREAK_CAP)
}

/// 近期错误惩罚
pub fn failure_penalty(recent_failures: u32) -> f64 {
    (recent_failures as f64 * FAILURE_STEP).min(FAILURE_CAP)
}

fn correct_bonus(ratio: f64) -> f64 {
    if ratio < 0.5 {
        0.5 + (0.5 - ratio) * 0.8
    } else if ratio < 0.7 {
        0.3 + (0.7 - ratio) * 0.5
    } else if ratio < 0.9 {
        0.15 + (0.9 - ratio) * 0.75
    } else if ratio < 1.1 {
        0.05
    } else {
        0.0
    }
}

fn incorrect_penalty(ratio: f64) -> f64 {
    if ratio < 0.5 {
        0.1
    } else if ratio < 0.8 {
        0.15
    } else if ratio < 1.2 {
        0.2
    } else if ratio < 2.0 {
        0.25 + (ratio - 1.2) * 0.1
    } else {
        0.4
    }
}

/// 响应时间调整
///
/// `ratio` is response time divided by the baseline average.
pub fn timing_adjustment(
    ratio: f64,
    is_correct: bool,
    is_away: bool,
    band: DifficultyBand,
    consecutive_correct_global: u32,
) -> TimingAdjustment {
    if !ratio.is_finite() || ratio < 0.0 {
        return TimingAdjustment::NEUTRAL;
    }

    if is_correct {
        let mut bonus = correct_bonus(ratio);
        let penalty = if ratio >= 1.5 && !is_away {
            ((ratio - 1.5) * 0.2).min(0.3)
        } else {
            0.0
        };

        match band {
            DifficultyBand::Easy if ratio > 1.2 => bonus *= 0.7,
            DifficultyBand::Hard if ratio < 0.8 => bonus *= 1.2,
            _ => {}
        }
        bonus *= 1.0 + GLOBAL_STREAK_STEP * consecutive_correct_global as f64;

        TimingAdjustment { bonus, penalty }
    } else {
        let mut penalty = incorrect_penalty(ratio);
        if is_away {
            penalty *= 0.5;
        }
        TimingAdjustment {
            bonus: 0.0,
            penalty,
        }
    }
}

/// Incorrect answers among the last `window` events in `scope`.
pub fn recent_failures(
    events: &[ResponseEvent],
    scope: HistoryScope,
    item_id: &str,
    window: usize,
) -> u32 {
    scoped_window(events, scope, item_id, window)
        .into_iter()
        .filter(|e| !e.is_correct)
        .count() as u32
}

// ==================== Update ====================

/// 计算新的熟练度分数
pub fn update(input: &ScoreInput<'_>) -> ScoreUpdate {
    let current = sanitize_score(input.current_score);

    let band = DifficultyBand::from_score(current);
    let learning_rate = band.learning_rate();

    let hours_since_review = input
        .last_reviewed_at_ms
        .map(|reviewed| hours_since(reviewed, input.now_ms));
    let time_factor = time_factor(hours_since_review);

    let response_ratio = match (
        sanitize_latency(input.response_time_ms),
        sanitize_average(input.avg_response_time_ms),
    ) {
        (Some(rt), Some(avg)) => Some(rt / avg),
        _ => None,
    };
    let timing = response_ratio.map_or(TimingAdjustment::NEUTRAL, |ratio| {
        timing_adjustment(
            ratio,
            input.is_correct,
            input.is_away,
            band,
            input.consecutive_correct_global,
        )
    });
    let timing_factor = timing.factor();

    let recent_failures = input.recent_events.iter().filter(|e| !e.is_correct).count() as u32;

    let (base_step, mastery_bonus, word_bonus, failure_penalty, total_step) = if input.is_correct {
        let base = band.base_decrement();
        let mastery = if current <= MASTERY_SCORE_MAX { MASTERY_BONUS } else { 0.0 };
        let word = word_bonus(input.consecutive_correct_for_item);
        let decrement = (base + mastery) * learning_rate * time_factor * timing_factor * word;
        (base, mastery, word, 0.0, -decrement)
    } else {
        let base = band.base_increment();
        let failure = failure_penalty(recent_failures);
        let increment = base * (1.0 + failure) * learning_rate * time_factor * timing_factor;
        (base, 0.0, 1.0, failure, increment)
    };

    let raw_score = current + total_step;
    let new_score = normalize_score(raw_score);

    ScoreUpdate {
        new_score,
        diagnostics: ScoreDiagnostics {
            band,
            learning_rate,
            hours_since_review,
            time_factor,
            response_ratio,
            is_away: input.is_away,
            timing_bonus: timing.bonus,
            timing_penalty: timing.penalty,
            timing_factor,
            word_bonus,
            mastery_bonus,
            recent_failures,
            failure_penalty,
            base_step,
            total_step,
            raw_score,
        },
    }
}
