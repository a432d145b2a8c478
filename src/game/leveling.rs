//! 経験値とレベルの計算

use serde::Serialize;

use super::resources::ResourceState;

/// レベルしきい値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelThreshold {
    pub level: u32,
    pub min_score: u32,
    pub title: &'static str,
}

/// 昇順に並んだレベル表（最上位より上はそのレベルで固定）
pub const LEVEL_THRESHOLDS: &[LevelThreshold] = &[
    LevelThreshold {
        level: 1,
        min_score: 0,
        title: "Chat Rookie",
    },
    LevelThreshold {
        level: 2,
        min_score: 200,
        title: "Trusted Mod",
    },
    LevelThreshold {
        level: 3,
        min_score: 600,
        title: "Discord Sheriff",
    },
    LevelThreshold {
        level: 4,
        min_score: 1200,
        title: "Supreme Admin",
    },
    LevelThreshold {
        level: 5,
        min_score: 2500,
        title: "Chat Legend",
    },
];

/// レベルアップの記録
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelChange {
    pub previous: u32,
    pub current: u32,
}

/// スコアに対応するしきい値を取得
///
/// 昇順に評価し、満たした最後のエントリが勝つ。
pub fn threshold_for_score(score: u32) -> &'static LevelThreshold {
    LEVEL_THRESHOLDS
        .iter()
        .fold(&LEVEL_THRESHOLDS[0], |acc, entry| {
            if score >= entry.min_score {
                entry
            } else {
                acc
            }
        })
}

pub fn level_for_score(score: u32) -> u32 {
    threshold_for_score(score).level
}

/// レベルの称号を取得
pub fn title_for_level(level: u32) -> &'static str {
    LEVEL_THRESHOLDS
        .iter()
        .rev()
        .find(|entry| entry.level <= level)
        .map(|entry| entry.title)
        .unwrap_or(LEVEL_THRESHOLDS[0].title)
}

/// 経験値を加算してレベルを再計算
///
/// レベルが上がった場合のみ `Some` を返す。
pub fn award_xp(resources: &mut ResourceState, xp: u32) -> Option<LevelChange> {
    let previous = resources.level();
    let score = resources.add_score(xp);
    resources.raise_level(level_for_score(score));

    let current = resources.level();
    (current > previous).then_some(LevelChange { previous, current })
}
