//! Review priority
//!
//! priority = (score + 0.5 · recent failures) · recency
//!
//! where recency = 0.5 + 0.5 · min(hours / 24, 1) when the item has been
//! reviewed before, and 1 otherwise. Higher means review sooner.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sanitize::sanitize_score;
use crate::types::{hours_since, ResponseEvent};

/// Weight of each recent failure
const FAILURE_WEIGHT: f64 = 0.5;

/// Recency factor for an item reviewed just now
const RECENCY_FLOOR: f64 = 0.5;

/// Hours after which the recency factor saturates
const RECENCY_SATURATION_HOURS: f64 = 24.0;

/// 计算单词复习优先级
pub fn priority(
    score: f64,
    recent_events_for_item: &[ResponseEvent],
    last_reviewed_at_ms: Option<i64>,
    now_ms: i64,
) -> f64 {
    let failures = recent_events_for_item.iter().filter(|e| !e.is_correct).count() as f64;
    let base = sanitize_score(score) + FAILURE_WEIGHT * failures;

    match last_reviewed_at_ms {
        Some(reviewed) => {
            let hours = hours_since(reviewed, now_ms);
            let saturation = (hours / RECENCY_SATURATION_HOURS).min(1.0);
            let recency = RECENCY_FLOOR + (1.0 - RECENCY_FLOOR) * saturation;
            base * recency
        }
        None => base,
    }
}

/// One schedulable item as the caller's store knows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCandidate {
    pub item_id: String,
    pub score: f64,
    pub recent_events: Vec<ResponseEvent>,
    pub last_reviewed_at_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    pub item_id: String,
    pub priority: f64,
}

/// Rank candidates most urgent first; ties are ordered by item id.
pub fn rank(candidates: &[ReviewCandidate], now_ms: i64) -> Vec<RankedItem> {
    let mut ranked: Vec<RankedItem> = candidates
        .par_iter()
        .map(|c| RankedItem {
            item_id: c.item_id.clone(),
            priority: priority(c.score, &c.recent_events, c.last_reviewed_at_ms, now_ms),
        })
        .collect();

    ranked.par_sort_by(|a, b| {
        b.priority
            .total_cmp(&a.priority)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    ranked
}

/// The `limit` most urgent items.
pub fn select_next(candidates: &[ReviewCandidate], now_ms: i64, limit: usize) -> Vec<RankedItem> {
    let mut ranked = rank(candidates, now_ms);
    ranked.truncate(limit);
    ranked
}
