//! Diagnostics hooks
//!
//! The engine reports every update through a [`ScoreObserver`] instead of
//! writing anywhere itself.

use parking_lot::Mutex;

use crate::scorer::ScoreDiagnostics;
use crate::types::ResponseEvent;

pub trait ScoreObserver: Send + Sync {
    fn on_score_update(&self, event: &ResponseEvent, diagnostics: &ScoreDiagnostics);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScoreObserver for NoopObserver {
    fn on_score_update(&self, _event: &ResponseEvent, _diagnostics: &ScoreDiagnostics) {}
}

/// Emits one `debug` event per update with the full factor breakdown
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ScoreObserver for TracingObserver {
    fn on_score_update(&self, event: &ResponseEvent, d: &ScoreDiagnostics) {
        tracing::debug!(
            item_id = %event.item_id,
            is_correct = event.is_correct,
            previous_score = event.previous_score,
            new_score = event.new_score,
            band = d.band.as_str(),
            learning_rate = d.learning_rate,
            time_factor = d.time_factor,
            response_ratio = ?d.response_ratio,
            is_away = d.is_away,
            timing_bonus = d.timing_bonus,
            timing_penalty = d.timing_penalty,
            timing_factor = d.timing_factor,
            word_bonus = d.word_bonus,
            failure_penalty = d.failure_penalty,
            total_step = d.total_step,
            "competency score updated"
        );
    }
}

/// Keeps every update in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    records: Mutex<Vec<(ResponseEvent, ScoreDiagnostics)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(ResponseEvent, ScoreDiagnostics)> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl ScoreObserver for RecordingObserver {
    fn on_score_update(&self, event: &ResponseEvent, diagnostics: &ScoreDiagnostics) {
        self.records.lock().push((event.clone(), diagnostics.clone()));
    }
}

impl<T: ScoreObserver + ?Sized> ScoreObserver for std::sync::Arc<T> {
    fn on_score_update(&self, event: &ResponseEvent, diagnostics: &ScoreDiagnostics) {
        (**self).on_score_update(event, diagnostics);
    }
}
