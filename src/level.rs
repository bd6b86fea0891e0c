//! Score <-> display level mapping
//!
//! The UI shows a 1-5 level; internally the score is continuous in
//! [0.5, 5.5]. The projection is many-to-one, so only
//! `score_to_level(level_to_score(l)) == l` is guaranteed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::types::{MIN_SCORE, SCORE_SPAN};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;

/// Integer difficulty level shown to the user, always in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DisplayLevel(u8);

impl DisplayLevel {
    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = DisplayLevel> {
        (MIN_LEVEL..=MAX_LEVEL).map(DisplayLevel)
    }

    pub fn info(&self) -> LevelInfo {
        level_info(*self)
    }
}

impl TryFrom<u8> for DisplayLevel {
    type Error = ScoringError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (MIN_LEVEL..=MAX_LEVEL).contains(&value) {
            Ok(DisplayLevel(value))
        } else {
            Err(ScoringError::InvalidLevel(value))
        }
    }
}

impl From<DisplayLevel> for u8 {
    fn from(level: DisplayLevel) -> Self {
        level.0
    }
}

impl fmt::Display for DisplayLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Label and colour token for a display level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub label: &'static str,
    pub color: &'static str,
}

const LEVEL_TABLE: [LevelInfo; 5] = [
    LevelInfo {
        label: "Very Easy",
        color: "emerald",
    },
    LevelInfo {
        label: "Easy",
        color: "blue",
    },
    LevelInfo {
        label: "Medium",
        color: "amber",
    },
    LevelInfo {
        label: "Hard",
        color: "orange",
    },
    LevelInfo {
        label: "Very Hard",
        color: "red",
    },
];

/// 连续分数 -> 显示等级
pub fn score_to_level(score: f64) -> DisplayLevel {
    if score.is_nan() {
        return DisplayLevel(3);
    }
    let normalized = (score - MIN_SCORE) / SCORE_SPAN;
    let level = (normalized * 4.0).round() + 1.0;
    DisplayLevel(level.clamp(MIN_LEVEL as f64, MAX_LEVEL as f64) as u8)
}

/// 显示等级 -> 连续分数
pub fn level_to_score(level: DisplayLevel) -> f64 {
    let normalized = (level.0 - MIN_LEVEL) as f64 / 4.0;
    MIN_SCORE + normalized * SCORE_SPAN
}

pub fn level_info(level: DisplayLevel) -> LevelInfo {
    LEVEL_TABLE[(level.0 - MIN_LEVEL) as usize]
}
