//! プレイヤーアクションの処理
//!
//! アクションをエンティティの削除・リソース増減・経験値付与へ変換する。
//! 対象IDが見つからない場合は状態を一切変更しない。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::leveling::{award_xp, LevelChange};
use super::notifications::{Notification, NotificationColor, NotificationIcon};
use super::state::GameState;

/// プレイヤーが実行できるアクション
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameAction {
    TimeoutUser,
    BanUser,
    PinMessage,
    ResolveAlert,
    ReplyPost,
    IgnorePost,
    CompleteTask,
}

impl GameAction {
    pub const ALL: [GameAction; 7] = [
        GameAction::TimeoutUser,
        GameAction::BanUser,
        GameAction::PinMessage,
        GameAction::ResolveAlert,
        GameAction::ReplyPost,
        GameAction::IgnorePost,
        GameAction::CompleteTask,
    ];

    /// 固定の経験値（タスク完了はテンプレート依存なのでNone）
    pub fn base_xp(&self) -> Option<u32> {
        match self {
            GameAction::TimeoutUser => Some(15),
            GameAction::BanUser => Some(25),
            GameAction::PinMessage => Some(10),
            GameAction::ResolveAlert => Some(40),
            GameAction::ReplyPost => Some(30),
            GameAction::IgnorePost => Some(5),
            GameAction::CompleteTask => None,
        }
    }

    /// (サニティ増分, ハイプ増分)
    pub fn resource_effect(&self) -> (i32, i32) {
        match self {
            GameAction::TimeoutUser | GameAction::BanUser => (2, 0),
            GameAction::PinMessage => (0, 5),
            GameAction::ResolveAlert => (10, 0),
            GameAction::ReplyPost => (2, 5),
            GameAction::IgnorePost => (0, 0),
            GameAction::CompleteTask => (3, 3),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameAction::TimeoutUser => "TIMEOUT",
            GameAction::BanUser => "BANNED",
            GameAction::PinMessage => "PINNED",
            GameAction::ResolveAlert => "RESOLVED",
            GameAction::ReplyPost => "REPLIED",
            GameAction::IgnorePost => "IGNORED",
            GameAction::CompleteTask => "TASK COMPLETE",
        }
    }

    pub fn color(&self) -> NotificationColor {
        match self {
            GameAction::TimeoutUser => NotificationColor::Yellow,
            GameAction::BanUser => NotificationColor::Red,
            GameAction::PinMessage => NotificationColor::Purple,
            GameAction::ResolveAlert => NotificationColor::Blue,
            GameAction::ReplyPost => NotificationColor::LightBlue,
            GameAction::IgnorePost => NotificationColor::White,
            GameAction::CompleteTask => NotificationColor::Green,
        }
    }

    pub fn icon(&self) -> Option<NotificationIcon> {
        match self {
            GameAction::TimeoutUser => Some(NotificationIcon::Timeout),
            GameAction::BanUser => Some(NotificationIcon::Shield),
            GameAction::ResolveAlert | GameAction::CompleteTask => Some(NotificationIcon::Check),
            GameAction::PinMessage | GameAction::ReplyPost | GameAction::IgnorePost => None,
        }
    }
}

/// 適用に成功したアクションの結果
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub action: GameAction,
    pub target_id: String,
    pub xp: u32,
    pub sanity: u8,
    pub hype: u8,
    pub level_change: Option<LevelChange>,
    /// 発行された通知（アクション通知、レベルアップ時はその通知も）
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Applied(ActionReport),
    /// 対象IDが存在しない
    NotFound,
    /// プレイ中ではない
    Inactive,
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied(_))
    }

    pub fn report(&self) -> Option<&ActionReport> {
        match self {
            ActionOutcome::Applied(report) => Some(report),
            _ => None,
        }
    }
}

/// アクションプロセッサ
pub struct ActionProcessor;

impl ActionProcessor {
    pub fn apply(
        state: &mut GameState,
        action: GameAction,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> ActionOutcome {
        if !state.resources.is_playing() {
            tracing::debug!(
                "🎮 [ACTION] {:?} ignored in phase {}",
                action,
                state.resources.phase().as_str()
            );
            return ActionOutcome::Inactive;
        }

        let Some(xp) = Self::remove_target(state, action, target_id) else {
            tracing::debug!("🎮 [ACTION] {:?} target not found: {}", action, target_id);
            return ActionOutcome::NotFound;
        };

        let (sanity_delta, hype_delta) = action.resource_effect();
        let sanity = state.resources.adjust_sanity(sanity_delta);
        let hype = state.resources.adjust_hype(hype_delta);

        let mut notifications = vec![state.notifications.push(
            format!("{}! +{} XP", action.label(), xp),
            action.color(),
            action.icon(),
            now,
        )];

        let level_change = award_xp(&mut state.resources, xp);
        if let Some(change) = level_change {
            notifications.push(state.notifications.push(
                format!("LEVEL UP! Level {}", change.current),
                NotificationColor::Gold,
                Some(NotificationIcon::Star),
                now,
            ));
            tracing::info!(
                "⭐ [ACTION] Level up: {} -> {} (score {})",
                change.previous,
                change.current,
                state.resources.score()
            );
        }

        state.stats.record(action);

        tracing::debug!(
            action = ?action,
            target = target_id,
            xp,
            sanity,
            hype,
            "🎮 [ACTION] Applied"
        );

        ActionOutcome::Applied(ActionReport {
            action,
            target_id: target_id.to_string(),
            xp,
            sanity,
            hype,
            level_change,
            notifications,
        })
    }

    /// 対象を探して（必要なら）削除し、付与する経験値を返す
    fn remove_target(state: &mut GameState, action: GameAction, target_id: &str) -> Option<u32> {
        match action {
            GameAction::TimeoutUser | GameAction::BanUser => {
                let index = state.chat.iter().position(|m| m.id == target_id)?;
                state.chat.remove(index);
            }
            GameAction::PinMessage => {
                if !state.chat.iter().any(|m| m.id == target_id) {
                    return None;
                }
            }
            GameAction::ResolveAlert => {
                let index = state.alerts.iter().position(|a| a.id == target_id)?;
                state.alerts.remove(index);
            }
            GameAction::ReplyPost | GameAction::IgnorePost => {
                let index = state.posts.iter().position(|p| p.id == target_id)?;
                state.posts.remove(index);
            }
            GameAction::CompleteTask => {
                let index = state.tasks.iter().position(|t| t.id == target_id)?;
                let task = state.tasks.remove(index);
                return Some(task.xp_reward);
            }
        }
        action.base_xp()
    }
}
