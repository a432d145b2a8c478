use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// チャットメッセージの種類
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageCategory {
    #[default]
    Normal,
    Spam,
    Hate,
    Mod,
    Sub,
}

impl MessageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageCategory::Normal => "NORMAL",
            MessageCategory::Spam => "SPAM",
            MessageCategory::Hate => "HATE",
            MessageCategory::Mod => "MOD",
            MessageCategory::Sub => "SUB",
        }
    }
}

/// 表示用チャットメッセージ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub author: String,
    pub content: String,
    pub category: MessageCategory,
    pub is_moderator: bool, // モデレーター名簿またはソース側のフラグ
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

/// アラートの深刻度
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

/// Discord風フィードのアラート
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: String,
    pub channel: String,
    pub user: String,
    pub issue: String,
    pub severity: Severity,
    /// 常にfalse。解決はリストからの削除で表す
    pub resolved: bool,
}

/// SNSフィードの投稿
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialPost {
    pub id: String,
    pub author: String,
    pub handle: String,
    pub content: String,
    pub likes: u32,
    pub is_brand_risk: bool, // 炎上対応が必要な投稿
    /// 常にfalse。返信・無視はリストからの削除で表す
    pub replied: bool,
}

/// モデレーションタスク
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub xp_reward: u32,
}

/// 新しい一意なIDを生成
pub fn new_entity_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
