//! セッション終了レポート

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::leveling::title_for_level;
use super::state::{GameState, ModerationStats};

/// セッションの集計結果（JSON出力用）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionReport {
    pub generated_at: DateTime<Utc>,
    pub phase: String,
    pub level: u32,
    pub title: String,
    pub score: u32,
    pub sanity: u8,
    pub hype: u8,
    pub viewers: u32,
    pub peak_viewers: u32,
    pub ticks: u64,
    pub visible_chat: usize,
    pub open_alerts: usize,
    pub open_posts: usize,
    pub open_tasks: usize,
    pub actions: ModerationCounts,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModerationCounts {
    pub timeouts: u32,
    pub bans: u32,
    pub pins: u32,
    pub alerts_resolved: u32,
    pub posts_replied: u32,
    pub posts_ignored: u32,
    pub tasks_completed: u32,
    pub total: u32,
}

impl From<&ModerationStats> for ModerationCounts {
    fn from(stats: &ModerationStats) -> Self {
        Self {
            timeouts: stats.timeouts,
            bans: stats.bans,
            pins: stats.pins,
            alerts_resolved: stats.alerts_resolved,
            posts_replied: stats.posts_replied,
            posts_ignored: stats.posts_ignored,
            tasks_completed: stats.tasks_completed,
            total: stats.total(),
        }
    }
}

impl SessionReport {
    pub fn from_state(state: &GameState, ticks: u64) -> Self {
        let resources = state.resources();
        Self {
            generated_at: Utc::now(),
            phase: resources.phase().as_str().to_string(),
            level: resources.level(),
            title: title_for_level(resources.level()).to_string(),
            score: resources.score(),
            sanity: resources.sanity(),
            hype: resources.hype(),
            viewers: resources.viewers(),
            peak_viewers: state.peak_viewers(),
            ticks,
            visible_chat: state.chat_messages().len(),
            open_alerts: state.alerts().len(),
            open_posts: state.posts().len(),
            open_tasks: state.tasks().len(),
            actions: ModerationCounts::from(state.stats()),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
