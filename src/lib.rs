//! # danci-scoring - 自适应难度评分引擎
//!
//! 本 crate 提供单词复习的难度评分与排程原语:
//!
//! - **Score Update** - 根据正误、响应时间、连续答对和复习间隔更新熟练度分数
//! - **Response Time Estimation** - 抗异常值的响应时间基线 (中位数 + EMA)
//! - **Away Detection** - 区分"用户离开"与正常思考时间
//! - **Review Priority** - 选择下一个需要复习的单词
//!
//! ## 设计理念
//!
//! - **无状态** - 所有函数只依赖显式输入，持久化由调用方负责
//! - **不会失败** - 异常输入退化为中性因子，输出分数始终在 [0.5, 5.5]
//! - **可观测** - 每次更新返回完整的因子分解，并通过观察者钩子上报
//!
//! ## 模块结构
//!
//! - [`scorer`] - 熟练度分数更新 (难度带、时间因子、连续奖励)
//! - [`timing`] - 响应时间基线估计
//! - [`away`] - 离开检测
//! - [`level`] - 分数与 1-5 显示等级互转
//! - [`stats`] - 学习会话统计
//! - [`priority`] - 复习优先级与排序
//! - [`engine`] - 组合以上模块的评分引擎
//! - [`observer`] - 诊断钩子
//! - [`config`] - 窗口与作用域配置
//! - [`sanitize`] - 输入清洗
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use danci_scoring::{update, score_to_level, ScoreInput};
//!
//! let result = update(&ScoreInput::new(3.0, true, 0));
//! assert_eq!(result.new_score, 2.4);
//! assert_eq!(score_to_level(result.new_score).value(), 3);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod away;
pub mod config;
pub mod engine;
pub mod error;
pub mod level;
pub mod observer;
pub mod priority;
pub mod sanitize;
pub mod scorer;
pub mod stats;
pub mod timing;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

pub use away::is_away;
pub use config::ScoringConfig;
pub use engine::{current_time_ms, ProcessedResponse, ResponseContext, ScoringEngine, Streaks};
pub use error::{Result, ScoringError};
pub use level::{level_info, level_to_score, score_to_level, DisplayLevel, LevelInfo};
pub use observer::{NoopObserver, RecordingObserver, ScoreObserver, TracingObserver};
pub use priority::{priority, rank, select_next, RankedItem, ReviewCandidate};
pub use scorer::{update, ScoreDiagnostics, ScoreInput, ScoreUpdate};
pub use stats::{aggregate, aggregate_by_item, SessionStats};
pub use timing::{estimate, TimingBaseline};
