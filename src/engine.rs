//! Scoring engine
//!
//! Ties the pieces together for one answer:
//!
//! 1. Pull the scoped latency window from the session and detect away
//! 2. Derive global / per-item streaks from the previous event
//! 3. Run the score update with the scoped failure window
//! 4. Build the immutable [`ResponseEvent`] and report it to the observer
//!
//! The engine keeps no state between calls; the caller persists the event,
//! the new score and the updated latency average.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::away::is_away;
use crate::config::ScoringConfig;
use crate::level::{score_to_level, DisplayLevel};
use crate::observer::{ScoreObserver, TracingObserver};
use crate::sanitize::{sanitize_average, sanitize_latency, sanitize_score};
use crate::scorer::{update, ScoreDiagnostics, ScoreInput};
use crate::timing::{estimate, history_for_scope};
use crate::types::{scoped_window, ResponseEvent};

/// Wall-clock time in epoch milliseconds
pub fn current_time_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// One answer plus the stored state needed to score it
#[derive(Debug, Clone)]
pub struct ResponseContext<'a> {
    pub item_id: &'a str,
    pub is_correct: bool,
    pub current_score: f64,
    pub response_time_ms: f64,
    /// Persisted latency baseline, if any
    pub avg_response_time_ms: Option<f64>,
    pub last_reviewed_at_ms: Option<i64>,
    pub now_ms: i64,
    /// Events already recorded in this session, oldest first
    pub session_events: &'a [ResponseEvent],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResponse {
    pub event: ResponseEvent,
    pub diagnostics: ScoreDiagnostics,
    pub level: DisplayLevel,
    /// Baseline to persist for the next answer
    pub updated_average_ms: Option<f64>,
}

/// Streak counts before the current answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streaks {
    pub global: u32,
    pub item: u32,
}

impl Streaks {
    /// Only the immediately preceding event matters: the per-item streak
    /// continues only when that event was the same item, answered correctly.
    pub fn before(session_events: &[ResponseEvent], item_id: &str) -> Self {
        match session_events.last() {
            Some(last) if last.is_correct => Self {
                global: last.consecutive_correct_global,
                item: if last.item_id == item_id {
                    last.consecutive_correct_for_item
                } else {
                    0
                },
            },
            _ => Self::default(),
        }
    }

    pub fn after(&self, is_correct: bool) -> Self {
        if is_correct {
            Self {
                global: self.global.saturating_add(1),
                item: self.item.saturating_add(1),
            }
        } else {
            Self::default()
        }
    }
}

pub struct ScoringEngine {
    config: ScoringConfig,
    observer: Box<dyn ScoreObserver>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            observer: Box::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl ScoreObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// 处理一次答题
    pub fn process(&self, ctx: &ResponseContext<'_>) -> ProcessedResponse {
        let scope = self.config.history_scope;
        let history = history_for_scope(
            ctx.session_events,
            scope,
            ctx.item_id,
            self.config.history_window,
        );

        let response_time = sanitize_latency(Some(ctx.response_time_ms));
        let baseline = sanitize_average(ctx.avg_response_time_ms).or_else(|| match response_time {
            Some(rt) if !history.is_empty() => sanitize_average(Some(estimate(&history, rt, None))),
            _ => None,
        });

        let away = response_time.map_or(false, |rt| {
            is_away(rt, baseline.unwrap_or(f64::INFINITY), &history)
        });

        let recent: Vec<ResponseEvent> = scoped_window(
            ctx.session_events,
            scope,
            ctx.item_id,
            self.config.failure_window,
        )
        .into_iter()
        .cloned()
        .collect();

        let streaks = Streaks::before(ctx.session_events, ctx.item_id);

        let result = update(&ScoreInput {
            current_score: ctx.current_score,
            is_correct: ctx.is_correct,
            consecutive_correct_global: streaks.global,
            consecutive_correct_for_item: streaks.item,
            last_reviewed_at_ms: ctx.last_reviewed_at_ms,
            now_ms: ctx.now_ms,
            recent_events: &recent,
            response_time_ms: response_time,
            avg_response_time_ms: baseline,
            is_away: away,
        });

        let streaks_after = streaks.after(ctx.is_correct);
        let event = ResponseEvent {
            item_id: ctx.item_id.to_string(),
            is_correct: ctx.is_correct,
            timestamp_ms: ctx.now_ms,
            response_time_ms: response_time.unwrap_or(0.0),
            previous_score: sanitize_score(ctx.current_score),
            new_score: result.new_score,
            consecutive_correct_global: streaks_after.global,
            consecutive_correct_for_item: streaks_after.item,
        };

        // away responses do not move the baseline
        let updated_average_ms = match response_time {
            Some(rt) if !away => Some(estimate(&history, rt, baseline)),
            _ => baseline,
        };

        self.observer.on_score_update(&event, &result.diagnostics);

        ProcessedResponse {
            level: score_to_level(result.new_score),
            event,
            diagnostics: result.diagnostics,
            updated_average_ms,
        }
    }

    /// Score independent answers in parallel, preserving input order.
    pub fn rescore_batch(&self, contexts: &[ResponseContext<'_>]) -> Vec<ProcessedResponse> {
        contexts.par_iter().map(|ctx| self.process(ctx)).collect()
    }
}
