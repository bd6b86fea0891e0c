//! Data Sanitization
//!
//! Input hygiene for values coming back from the caller's store.
//!
//! Functions:
//! - Score sanitization
//! - Latency sanitization
//! - History sanitization

use crate::types::{DEFAULT_SCORE, MAX_SCORE, MIN_SCORE};

/// 清理输入分数：NaN 取中性默认值，其余截断到 [0.5, 5.5]
pub fn sanitize_score(score: f64) -> f64 {
    if score.is_nan() {
        DEFAULT_SCORE
    } else {
        score.clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// 清理单个响应时间，无效值视为缺失
pub fn sanitize_latency(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// 清理平均响应时间：必须为正数，否则视为缺失
pub fn sanitize_average(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// 清理响应时间历史，移除 NaN、Inf 和负数
pub fn sanitize_history(history: &[f64]) -> Vec<f64> {
    history
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .collect()
}
