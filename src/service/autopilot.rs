//! 自動モデレーター
//!
//! ヘッドレス実行時にプレイヤーの代わりに1ティック1アクションを選ぶ。
//! 優先度はアラート > HATE > SPAM > タスク > ブランドリスク投稿 > その他の投稿。

use crate::game::{GameAction, GameSnapshot, MessageCategory};

/// 次に実行するアクションを選ぶ
pub fn choose_action(snapshot: &GameSnapshot) -> Option<(GameAction, String)> {
    if let Some(alert) = snapshot.alerts.first() {
        return Some((GameAction::ResolveAlert, alert.id.clone()));
    }

    // 新しいメッセージから見る
    let newest_with = |category: MessageCategory| {
        snapshot
            .chat_messages
            .iter()
            .rev()
            .find(|m| m.category == category && !m.is_moderator)
    };
    if let Some(message) = newest_with(MessageCategory::Hate) {
        return Some((GameAction::BanUser, message.id.clone()));
    }
    if let Some(message) = newest_with(MessageCategory::Spam) {
        return Some((GameAction::TimeoutUser, message.id.clone()));
    }

    if let Some(task) = snapshot.tasks.iter().max_by_key(|t| t.xp_reward) {
        return Some((GameAction::CompleteTask, task.id.clone()));
    }

    if let Some(post) = snapshot.posts.iter().find(|p| p.is_brand_risk) {
        return Some((GameAction::ReplyPost, post.id.clone()));
    }
    snapshot
        .posts
        .last()
        .map(|post| (GameAction::IgnorePost, post.id.clone()))
}
