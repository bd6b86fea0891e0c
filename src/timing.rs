//! Response Time Estimation
//!
//! Maintains the latency baseline the scorer compares each answer against.
//!
//! Algorithm:
//! - Drop away responses (> 30 s) and extreme outliers (> 4x previous average)
//! - Without a previous average, the baseline is the median of what is left
//! - With one, blend the current response in by EMA; the further the current
//!   response is from the baseline, the smaller its weight

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::sanitize::{sanitize_average, sanitize_history, sanitize_latency};
use crate::types::{scoped_window, HistoryScope, ResponseEvent, AWAY_THRESHOLD_MS};

// ==================== Constants ====================

/// Responses above this multiple of the previous average are outliers
const OUTLIER_MULTIPLIER: f64 = 4.0;

/// EMA weight when the current response deviates by more than 200%
const ALPHA_EXTREME: f64 = 0.1;

/// EMA weight when the current response deviates by more than 100%
const ALPHA_LARGE: f64 = 0.2;

/// EMA weight for ordinary responses
const ALPHA_NORMAL: f64 = 0.4;

// ==================== Estimation ====================

/// Median of a non-empty slice
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// EMA weight for the current response given its relative deviation
fn ema_alpha(current_ms: f64, previous_average: f64) -> f64 {
    let deviation = (current_ms - previous_average).abs() / previous_average;
    if deviation > 2.0 {
        ALPHA_EXTREME
    } else if deviation > 1.0 {
        ALPHA_LARGE
    } else {
        ALPHA_NORMAL
    }
}

/// 计算新的平均响应时间
///
/// `previous_average` that is missing, zero, negative or NaN is treated as
/// "no baseline yet".
pub fn estimate(
    history: &[f64],
    current_response_time_ms: f64,
    previous_average: Option<f64>,
) -> f64 {
    let previous = sanitize_average(previous_average);
    let current = sanitize_latency(Some(current_response_time_ms));

    let mut filtered: Vec<f64> = sanitize_history(history)
        .into_iter()
        .filter(|&v| v <= AWAY_THRESHOLD_MS)
        .filter(|&v| previous.map_or(true, |avg| v <= OUTLIER_MULTIPLIER * avg))
        .collect();

    if filtered.len() < history.len() {
        tracing::trace!(
            dropped = history.len() - filtered.len(),
            "filtered away/outlier response times"
        );
    }

    match (previous, current) {
        (Some(avg), Some(current)) => {
            let alpha = ema_alpha(current, avg);
            avg * (1.0 - alpha) + current * alpha
        }
        (Some(avg), None) => avg,
        (None, current) => {
            if filtered.is_empty() {
                match current {
                    Some(current) => filtered.push(current),
                    None => return 0.0,
                }
            }
            median(&mut filtered)
        }
    }
}

/// Response times of the last `window` events in scope, oldest first.
///
/// Events stored without a usable latency carry `0.0`; those are skipped
/// so they never drag the median down.
pub fn history_for_scope(
    events: &[ResponseEvent],
    scope: HistoryScope,
    item_id: &str,
    window: usize,
) -> Vec<f64> {
    scoped_window(events, scope, item_id, window)
        .into_iter()
        .map(|e| e.response_time_ms)
        .filter(|&rt| rt.is_finite() && rt > 0.0)
        .collect()
}

// ==================== Timing Baseline ====================

/// Smoothed latency baseline plus the raw window it was derived from.
///
/// Owned and persisted by the caller; scope it to whatever counts as one
/// timing context (a study session, or a single item).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBaseline {
    pub average_ms: Option<f64>,
    pub history: VecDeque<f64>,
}

impl TimingBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_slice(&self) -> Vec<f64> {
        self.history.iter().copied().collect()
    }

    /// Fold a new response into the baseline and return the new average.
    pub fn record(&mut self, response_time_ms: f64, window: usize) -> f64 {
        let history = self.history_slice();
        let average = estimate(&history, response_time_ms, self.average_ms);
        self.average_ms = Some(average);

        if sanitize_latency(Some(response_time_ms)).is_some() {
            self.history.push_back(response_time_ms);
        }
        while self.history.len() > window.max(1) {
            self.history.pop_front();
        }
        average
    }
}
