//! セッションの所有状態
//!
//! リソースと表示中エンティティのリストをまとめて保持する。
//! 書き換えはスケジューラとアクション処理からのみ行われる。

use serde::Serialize;
use std::collections::VecDeque;

use super::actions::GameAction;
use super::models::{Alert, ChatMessage, SocialPost, Task};
use super::notifications::{Notification, NotificationCenter};
use super::resources::ResourceState;
use crate::config::GameConfig;

/// アクション種別ごとの実行回数
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ModerationStats {
    pub timeouts: u32,
    pub bans: u32,
    pub pins: u32,
    pub alerts_resolved: u32,
    pub posts_replied: u32,
    pub posts_ignored: u32,
    pub tasks_completed: u32,
}

impl ModerationStats {
    pub(crate) fn record(&mut self, action: GameAction) {
        let counter = match action {
            GameAction::TimeoutUser => &mut self.timeouts,
            GameAction::BanUser => &mut self.bans,
            GameAction::PinMessage => &mut self.pins,
            GameAction::ResolveAlert => &mut self.alerts_resolved,
            GameAction::ReplyPost => &mut self.posts_replied,
            GameAction::IgnorePost => &mut self.posts_ignored,
            GameAction::CompleteTask => &mut self.tasks_completed,
        };
        *counter += 1;
    }

    pub fn total(&self) -> u32 {
        self.timeouts
            + self.bans
            + self.pins
            + self.alerts_resolved
            + self.posts_replied
            + self.posts_ignored
            + self.tasks_completed
    }
}

/// ゲームの状態
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) resources: ResourceState,
    pub(crate) chat: VecDeque<ChatMessage>,
    pub(crate) alerts: Vec<Alert>,
    /// 新しい順
    pub(crate) posts: VecDeque<SocialPost>,
    pub(crate) tasks: Vec<Task>,
    pub(crate) notifications: NotificationCenter,
    pub(crate) stats: ModerationStats,
    pub(crate) peak_viewers: u32,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        let resources = ResourceState::new(
            config.initial_sanity,
            config.initial_hype,
            config.initial_viewers,
        );
        Self {
            resources,
            chat: VecDeque::with_capacity(config.visible_chat_cap),
            alerts: Vec::new(),
            posts: VecDeque::new(),
            tasks: Vec::new(),
            notifications: NotificationCenter::new(config.notification_duration()),
            stats: ModerationStats::default(),
            peak_viewers: config.initial_viewers,
        }
    }

    pub fn resources(&self) -> &ResourceState {
        &self.resources
    }

    pub fn chat_messages(&self) -> &VecDeque<ChatMessage> {
        &self.chat
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn posts(&self) -> &VecDeque<SocialPost> {
        &self.posts
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.items()
    }

    pub fn stats(&self) -> &ModerationStats {
        &self.stats
    }

    /// セッション中の最大視聴者数
    pub fn peak_viewers(&self) -> u32 {
        self.peak_viewers
    }

    pub(crate) fn track_viewers(&mut self) {
        self.peak_viewers = self.peak_viewers.max(self.resources.viewers());
    }
}

/// レンダラー向けのスナップショット
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub resources: ResourceState,
    pub level_title: &'static str,
    pub chat_messages: Vec<ChatMessage>,
    pub alerts: Vec<Alert>,
    pub posts: Vec<SocialPost>,
    pub tasks: Vec<Task>,
    pub notifications: Vec<Notification>,
    pub brand_risk_posts: usize,
    pub ticks: u64,
    pub buffered_chat: usize,
    pub buffered_alerts: usize,
    pub buffered_posts: usize,
}

impl GameSnapshot {
    pub fn capture(state: &GameState, ticks: u64, buffered: (usize, usize, usize)) -> Self {
        Self {
            resources: state.resources,
            level_title: super::leveling::title_for_level(state.resources.level()),
            chat_messages: state.chat.iter().cloned().collect(),
            alerts: state.alerts.clone(),
            posts: state.posts.iter().cloned().collect(),
            tasks: state.tasks.clone(),
            notifications: state.notifications.items().to_vec(),
            brand_risk_posts: state.posts.iter().filter(|p| p.is_brand_risk).count(),
            ticks,
            buffered_chat: buffered.0,
            buffered_alerts: buffered.1,
            buffered_posts: buffered.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_uses_config() {
        let config = GameConfig {
            initial_sanity: 70,
            initial_hype: 20,
            initial_viewers: 42,
            ..Default::default()
        };
        let state = GameState::new(&config);

        assert_eq!(state.resources().sanity(), 70);
        assert_eq!(state.resources().hype(), 20);
        assert_eq!(state.resources().viewers(), 42);
        assert_eq!(state.peak_viewers(), 42);
        assert!(state.chat_messages().is_empty());
        assert!(state.tasks().is_empty());
    }

    #[test]
    fn test_stats_record() {
        let mut stats = ModerationStats::default();
        stats.record(GameAction::BanUser);
        stats.record(GameAction::BanUser);
        stats.record(GameAction::CompleteTask);

        assert_eq!(stats.bans, 2);
        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.total(), 3);
    }
}
