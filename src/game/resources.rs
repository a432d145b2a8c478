//! リソースモデル（サニティ・ハイプ・視聴者数・スコア）

use serde::{Deserialize, Serialize};

/// メーターの上限値
pub const METER_MAX: u8 = 100;

/// セッションのフェーズ
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    NotStarted,
    Playing,
    Paused,
    /// サニティが0に到達した終端状態
    Over,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::NotStarted => "not-started",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::Over => "over",
        }
    }
}

/// セッションのリソース状態
///
/// メーターは常に `0..=METER_MAX` に収まる。スコアとレベルは減少しない。
/// 書き換えはクレート内（スケジューラとアクション処理）に限られる。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceState {
    sanity: u8,
    hype: u8,
    viewers: u32,
    phase: GamePhase,
    score: u32,
    level: u32,
}

impl ResourceState {
    pub fn new(sanity: u8, hype: u8, viewers: u32) -> Self {
        Self {
            sanity: sanity.min(METER_MAX),
            hype: hype.min(METER_MAX),
            viewers,
            phase: GamePhase::NotStarted,
            score: 0,
            level: 1,
        }
    }

    pub fn sanity(&self) -> u8 {
        self.sanity
    }

    pub fn hype(&self) -> u8 {
        self.hype
    }

    pub fn viewers(&self) -> u32 {
        self.viewers
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    /// サニティを増減（クランプ済みの新しい値を返す）
    pub(crate) fn adjust_sanity(&mut self, delta: i32) -> u8 {
        self.sanity = clamp_meter(self.sanity, delta);
        self.sanity
    }

    /// ハイプを増減（クランプ済みの新しい値を返す）
    pub(crate) fn adjust_hype(&mut self, delta: i32) -> u8 {
        self.hype = clamp_meter(self.hype, delta);
        self.hype
    }

    /// 視聴者数を増減（下限0）
    pub(crate) fn adjust_viewers(&mut self, delta: i64) -> u32 {
        let next = (self.viewers as i64 + delta).clamp(0, u32::MAX as i64);
        self.viewers = next as u32;
        self.viewers
    }

    pub(crate) fn add_score(&mut self, xp: u32) -> u32 {
        self.score = self.score.saturating_add(xp);
        self.score
    }

    /// レベルを更新（下がる方向の更新は無視）
    pub(crate) fn raise_level(&mut self, level: u32) {
        self.level = self.level.max(level);
    }
}

impl Default for ResourceState {
    fn default() -> Self {
        use super::constants::{INITIAL_HYPE, INITIAL_SANITY, INITIAL_VIEWERS};
        Self::new(INITIAL_SANITY, INITIAL_HYPE, INITIAL_VIEWERS)
    }
}

fn clamp_meter(value: u8, delta: i32) -> u8 {
    (value as i32 + delta).clamp(0, METER_MAX as i32) as u8
}
