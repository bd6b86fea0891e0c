//! Engine Integration Tests
//!
//! Drives the engine through whole sessions the way a quiz flow would:
//! feed each answer with the events recorded so far, store the result,
//! then summarise and schedule.

use std::collections::HashMap;
use std::sync::Arc;

use danci_scoring::{
    aggregate, is_away, rank, score_to_level, HistoryScope, ProcessedResponse, RecordingObserver,
    ResponseContext, ResponseEvent, ReviewCandidate, ScoringConfig, ScoringEngine, TimingBaseline,
    TracingObserver,
};

const NOW: i64 = 1_700_000_000_000;
const SECOND_MS: i64 = 1000;

struct Answer {
    item: &'static str,
    correct: bool,
    response_ms: f64,
}

fn answer(item: &'static str, correct: bool, response_ms: f64) -> Answer {
    Answer {
        item,
        correct,
        response_ms,
    }
}

/// Replays a session, persisting scores and baseline like the caller's store would.
fn replay(
    engine: &ScoringEngine,
    answers: &[Answer],
) -> (Vec<ProcessedResponse>, HashMap<String, f64>) {
    let mut scores: HashMap<String, f64> = HashMap::new();
    let mut last_reviewed: HashMap<String, i64> = HashMap::new();
    let mut events: Vec<ResponseEvent> = Vec::new();
    let mut average: Option<f64> = None;
    let mut results = Vec::new();

    for (i, a) in answers.iter().enumerate() {
        let now = NOW + i as i64 * 10 * SECOND_MS;
        let ctx = ResponseContext {
            item_id: a.item,
            is_correct: a.correct,
            current_score: scores.get(a.item).copied().unwrap_or(3.0),
            response_time_ms: a.response_ms,
            avg_response_time_ms: average,
            last_reviewed_at_ms: last_reviewed.get(a.item).copied(),
            now_ms: now,
            session_events: &events,
        };
        let out = engine.process(&ctx);

        scores.insert(a.item.to_string(), out.event.new_score);
        last_reviewed.insert(a.item.to_string(), now);
        average = out.updated_average_ms;
        events.push(out.event.clone());
        results.push(out);
    }

    (results, scores)
}

#[test]
fn test_session_replay_summary() {
    let engine = ScoringEngine::default();
    let answers = vec![
        answer("apple", true, 4000.0),
        answer("bridge", true, 3500.0),
        answer("candle", false, 6000.0),
        answer("apple", true, 2500.0),
        answer("bridge", true, 3000.0),
    ];
    let (results, scores) = replay(&engine, &answers);
    let events: Vec<ResponseEvent> = results.iter().map(|r| r.event.clone()).collect();

    let stats = aggregate(&events);
    assert_eq!(stats.total, 5);
    assert_eq!(stats.correct, 4);
    assert_eq!(stats.accuracy_pct, 80.0);
    assert_eq!(stats.longest_streak, 2);
    assert_eq!(stats.current_streak, 2);
    assert_eq!(aggregate(&events), stats);

    assert!(scores["apple"] < 3.0);
    assert!(scores["candle"] > 3.0);
    assert_eq!(events[4].consecutive_correct_global, 2);
}

#[test]
fn test_shuffled_batch_gets_no_item_bonus() {
    let engine = ScoringEngine::default();
    let answers = vec![
        answer("a", true, 3000.0),
        answer("b", true, 3000.0),
        answer("a", true, 3000.0),
        answer("b", true, 3000.0),
    ];
    let (results, _) = replay(&engine, &answers);
    assert!(results.iter().all(|r| r.diagnostics.word_bonus == 1.0));
    assert!(results.iter().all(|r| r.event.consecutive_correct_for_item == 1));
}

#[test]
fn test_repeated_item_compounds_bonus() {
    let engine = ScoringEngine::default();
    let answers = vec![
        answer("a", true, 3000.0),
        answer("a", true, 3000.0),
        answer("a", true, 3000.0),
    ];
    let (results, scores) = replay(&engine, &answers);
    assert_eq!(results[0].diagnostics.word_bonus, 1.0);
    assert!((results[1].diagnostics.word_bonus - 1.8).abs() < 1e-9);
    assert!((results[2].diagnostics.word_bonus - 3.24).abs() < 1e-9);
    assert_eq!(scores["a"], 0.5);
}

#[test]
fn test_history_scope_boundary() {
    // b 的错误只在 session 作用域下计入 a 的惩罚
    let answers = vec![
        answer("b", false, 3000.0),
        answer("b", false, 3000.0),
        answer("a", false, 3000.0),
    ];

    let session = ScoringEngine::default();
    let (results, _) = replay(&session, &answers);
    assert_eq!(results[2].diagnostics.recent_failures, 2);

    let config = ScoringConfig::from_json(r#"{"historyScope":"item"}"#).unwrap();
    assert_eq!(config.history_scope, HistoryScope::Item);
    let per_item = ScoringEngine::new(config);
    let (results, _) = replay(&per_item, &answers);
    assert_eq!(results[2].diagnostics.recent_failures, 0);
    assert!(results[2].event.new_score < 4.0);
}

#[test]
fn test_history_scope_latency_window() {
    // b 的快速作答只在 session 作用域下构成 a 的基线
    let (results, _) = replay(
        &ScoringEngine::default(),
        &[answer("b", true, 4000.0), answer("b", true, 4200.0)],
    );
    let events: Vec<ResponseEvent> = results.iter().map(|r| r.event.clone()).collect();
    let slow = ResponseContext {
        item_id: "a",
        is_correct: true,
        current_score: 3.0,
        response_time_ms: 14_000.0,
        avg_response_time_ms: None,
        last_reviewed_at_ms: None,
        now_ms: NOW,
        session_events: &events,
    };

    let session = ScoringEngine::default().process(&slow);
    assert!(session.diagnostics.is_away);
    assert_eq!(session.updated_average_ms, Some(4100.0));

    let config = ScoringConfig {
        history_scope: HistoryScope::Item,
        ..ScoringConfig::default()
    };
    let per_item = ScoringEngine::new(config).process(&slow);
    assert!(!per_item.diagnostics.is_away);
    assert_eq!(per_item.diagnostics.response_ratio, None);
    assert_eq!(per_item.diagnostics.timing_factor, 1.0);
}

#[test]
fn test_failure_window_limits_lookback() {
    let config = ScoringConfig {
        failure_window: 2,
        ..ScoringConfig::default()
    };
    let engine = ScoringEngine::new(config);
    let answers = vec![
        answer("x", false, 3000.0),
        answer("x", false, 3000.0),
        answer("y", true, 3000.0),
        answer("y", true, 3000.0),
        answer("z", false, 3000.0),
    ];
    let (results, _) = replay(&engine, &answers);
    assert_eq!(results[4].diagnostics.recent_failures, 0);
}

#[test]
fn test_away_answer_not_penalised() {
    let engine = ScoringEngine::default();
    let answers = vec![
        answer("a", true, 4000.0),
        answer("b", true, 4200.0),
        answer("c", true, 45_000.0),
    ];
    let (results, _) = replay(&engine, &answers);
    let away = &results[2];
    assert!(away.diagnostics.is_away);
    assert_eq!(away.diagnostics.timing_penalty, 0.0);
    assert_eq!(away.updated_average_ms, results[1].updated_average_ms);
    assert!(is_away(45_000.0, 5_000.0, &[4_000.0, 4_200.0]));
}

#[test]
fn test_baseline_matches_engine_average() {
    let mut baseline = TimingBaseline::new();
    for rt in [4000.0, 4400.0, 3600.0] {
        baseline.record(rt, 10);
    }
    let json = serde_json::to_string(&baseline).unwrap();
    let restored: TimingBaseline = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, baseline);
    assert!(json.contains("averageMs"));
}

#[test]
fn test_rank_after_session() {
    let engine = ScoringEngine::default();
    let answers = vec![
        answer("easy", true, 2000.0),
        answer("hard", false, 8000.0),
        answer("hard", false, 8000.0),
        answer("mid", true, 5000.0),
    ];
    let (results, scores) = replay(&engine, &answers);
    let events: Vec<ResponseEvent> = results.iter().map(|r| r.event.clone()).collect();

    let candidates: Vec<ReviewCandidate> = scores
        .iter()
        .map(|(id, score)| ReviewCandidate {
            item_id: id.clone(),
            score: *score,
            recent_events: events.iter().filter(|e| &e.item_id == id).cloned().collect(),
            last_reviewed_at_ms: None,
        })
        .collect();
    let ranked = rank(&candidates, NOW);
    assert_eq!(ranked[0].item_id, "hard");
    assert_eq!(ranked.last().unwrap().item_id, "easy");
    assert!(score_to_level(scores["hard"]).value() >= 4);
}

#[test]
fn test_parallel_rescore_matches_sequential() {
    let recorder = Arc::new(RecordingObserver::new());
    let engine = ScoringEngine::default().with_observer(recorder.clone());
    let events: Vec<ResponseEvent> = Vec::new();
    let items: Vec<String> = (0..64).map(|i| format!("w{i}")).collect();
    let contexts: Vec<ResponseContext<'_>> = items
        .iter()
        .enumerate()
        .map(|(i, id)| ResponseContext {
            item_id: id.as_str(),
            is_correct: i % 3 != 0,
            current_score: 0.5 + (i % 50) as f64 / 10.0,
            response_time_ms: 1000.0 + i as f64 * 100.0,
            avg_response_time_ms: Some(4000.0),
            last_reviewed_at_ms: Some(NOW - i as i64 * 3_600_000),
            now_ms: NOW,
            session_events: &events,
        })
        .collect();

    let parallel = engine.rescore_batch(&contexts);
    let sequential: Vec<ProcessedResponse> = contexts.iter().map(|c| engine.process(c)).collect();
    assert_eq!(parallel, sequential);
    assert_eq!(recorder.len(), 128);
}

#[test]
fn test_tracing_observer_under_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let engine = ScoringEngine::default().with_observer(TracingObserver);
        let (results, _) = replay(
            &engine,
            &[answer("a", true, 3000.0), answer("a", false, 50_000.0)],
        );
        assert_eq!(results.len(), 2);
    });
}
