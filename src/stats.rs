//! Session statistics
//!
//! Single-pass summary over an ordered list of scored responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{round_to, ResponseEvent};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// Percentage, one decimal place
    pub accuracy_pct: f64,
    /// Mean of new - previous score, two decimal places
    pub avg_score_delta: f64,
    pub longest_streak: u32,
    /// Streak still running at the end (0 if the last answer was wrong)
    pub current_streak: u32,
}

/// 汇总一组答题事件
pub fn aggregate(events: &[ResponseEvent]) -> SessionStats {
    aggregate_iter(events.iter())
}

fn aggregate_iter<'a>(events: impl Iterator<Item = &'a ResponseEvent>) -> SessionStats {
    let mut total = 0u32;
    let mut correct = 0u32;
    let mut streak = 0u32;
    let mut longest_streak = 0u32;
    let mut delta_sum = 0.0;
    let mut last_correct = false;

    for event in events {
        total += 1;
        if event.is_correct {
            correct += 1;
            streak += 1;
            longest_streak = longest_streak.max(streak);
        } else {
            streak = 0;
        }
        delta_sum += event.score_delta();
        last_correct = event.is_correct;
    }

    if total == 0 {
        return SessionStats::default();
    }

    SessionStats {
        total,
        correct,
        incorrect: total - correct,
        accuracy_pct: round_to(correct as f64 / total as f64 * 100.0, 1),
        avg_score_delta: round_to(delta_sum / total as f64, 2),
        longest_streak,
        current_streak: if last_correct { streak } else { 0 },
    }
}

/// Per-item summaries, keyed by item id.
pub fn aggregate_by_item(events: &[ResponseEvent]) -> BTreeMap<String, SessionStats> {
    let mut grouped: BTreeMap<&str, Vec<&ResponseEvent>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.item_id.as_str()).or_default().push(event);
    }

    grouped
        .into_iter()
        .map(|(item_id, item_events)| {
            (item_id.to_string(), aggregate_iter(item_events.into_iter()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(item: &str, correct: bool, previous: f64, new: f64) -> ResponseEvent {
        ResponseEvent {
            item_id: item.to_string(),
            is_correct: correct,
            timestamp_ms: 0,
            response_time_ms: 2000.0,
            previous_score: previous,
            new_score: new,
            consecutive_correct_global: 0,
            consecutive_correct_for_item: 0,
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        let stats = aggregate(&[]);
        assert_eq!(stats, SessionStats::default());
        assert_eq!(stats.accuracy_pct, 0.0);
        assert_eq!(stats.avg_score_delta, 0.0);
    }

    #[test]
    fn test_mixed_session() {
        let events = vec![
            event("a", true, 3.0, 2.4),
            event("b", true, 3.0, 2.4),
            event("c", false, 3.0, 3.8),
            event("a", true, 2.4, 1.8),
        ];
        let stats = aggregate(&events);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.correct, 3);
        assert_eq!(stats.incorrect, 1);
        assert_eq!(stats.accuracy_pct, 75.0);
        // (-0.6 - 0.6 + 0.8 - 0.6) / 4 = -0.25
        assert_eq!(stats.avg_score_delta, -0.25);
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn test_current_streak_zero_after_miss() {
        let events = vec![event("a", true, 3.0, 2.4), event("a", false, 2.4, 3.2)];
        let stats = aggregate(&events);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn test_accuracy_rounding() {
        let events = vec![
            event("a", true, 3.0, 2.4),
            event("b", false, 3.0, 3.8),
            event("c", false, 3.0, 3.8),
        ];
        assert_eq!(aggregate(&events).accuracy_pct, 33.3);
    }

    #[test]
    fn test_aggregate_by_item() {
        let events = vec![
            event("a", true, 3.0, 2.4),
            event("b", false, 3.0, 3.8),
            event("a", true, 2.4, 1.8),
        ];
        let by_item = aggregate_by_item(&events);
        assert_eq!(by_item.len(), 2);
        assert_eq!(by_item["a"].longest_streak, 2);
        assert_eq!(by_item["a"].accuracy_pct, 100.0);
        assert_eq!(by_item["b"].current_streak, 0);
    }
}
