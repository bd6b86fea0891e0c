//! Away Detection
//!
//! Separates "the user walked away" from genuine thinking time so that long
//! pauses are not punished as slow recall.
//!
//! A response counts as away when:
//! - it exceeds the hard ceiling of 30 s, or
//! - it is more than 3x the baseline average AND more than 2x the slowest
//!   recent response.

use crate::sanitize::sanitize_history;
use crate::types::AWAY_THRESHOLD_MS;

/// Multiple of the baseline average a response must exceed
const AVERAGE_MULTIPLIER: f64 = 3.0;

/// Multiple of the slowest recent response a response must exceed
const HISTORY_MAX_MULTIPLIER: f64 = 2.0;

/// 判断一次响应是否因用户离开而变长
pub fn is_away(response_time_ms: f64, avg_response_time_ms: f64, recent_history: &[f64]) -> bool {
    if response_time_ms.is_nan() {
        return false;
    }
    if response_time_ms > AWAY_THRESHOLD_MS {
        tracing::trace!(response_time_ms, "away: exceeds hard ceiling");
        return true;
    }

    let history = sanitize_history(recent_history);
    let slowest_recent = history.iter().copied().fold(0.0_f64, f64::max);

    let away = response_time_ms > AVERAGE_MULTIPLIER * avg_response_time_ms
        && response_time_ms > HISTORY_MAX_MULTIPLIER * slowest_recent;

    if away {
        tracing::trace!(
            response_time_ms,
            avg_response_time_ms,
            slowest_recent,
            "away: far above baseline and recent maximum"
        );
    }
    away
}
