//! 一時通知（レンダラー向け）
//!
//! シミュレーションの正規の状態ではなく、表示時間が過ぎると消える。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::models::new_entity_id;

/// 通知の表示色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationColor {
    Yellow,
    Red,
    Blue,
    LightBlue,
    Purple,
    Green,
    Gold,
    White,
}

/// 通知アイコン
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationIcon {
    Timeout,
    Shield,
    Check,
    Star,
}

/// 一時通知
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub text: String,
    pub color: NotificationColor,
    pub icon: Option<NotificationIcon>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// 表示中の通知を管理
#[derive(Debug, Clone, Serialize)]
pub struct NotificationCenter {
    items: Vec<Notification>,
    #[serde(skip)]
    display_duration: Duration,
}

impl NotificationCenter {
    pub fn new(display_duration: std::time::Duration) -> Self {
        Self {
            items: Vec::new(),
            display_duration: Duration::from_std(display_duration)
                .unwrap_or_else(|_| Duration::milliseconds(2000)),
        }
    }

    /// 通知を追加し、追加した通知のコピーを返す
    pub fn push(
        &mut self,
        text: impl Into<String>,
        color: NotificationColor,
        icon: Option<NotificationIcon>,
        now: DateTime<Utc>,
    ) -> Notification {
        let notification = Notification {
            id: new_entity_id(),
            text: text.into(),
            color,
            icon,
            created_at: now,
            expires_at: now + self.display_duration,
        };
        self.items.push(notification.clone());
        notification
    }

    /// 指定IDの通知を消す
    pub fn expire(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// 期限切れの通知をまとめて消す
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut expired = Vec::new();
        self.items.retain(|n| {
            if n.is_expired(now) {
                expired.push(n.id.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
