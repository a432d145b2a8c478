//! コンテンツソースが返す生データ
//!
//! ワイヤー形式は外部生成サービスのJSONに合わせてcamelCase。

use serde::{Deserialize, Serialize};

use crate::game::models::{MessageCategory, Severity};

/// 生のチャットメッセージ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawChatMessage {
    pub username: String,
    pub content: String,
    #[serde(rename = "type")]
    pub category: MessageCategory,
    #[serde(default)]
    pub is_mod: Option<bool>,
}

/// 生のアラート
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawAlert {
    pub channel: String,
    pub user: String,
    pub issue: String,
    pub severity: Severity,
}

/// 生のSNS投稿
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    pub username: String,
    #[serde(default)]
    pub handle: Option<String>,
    pub content: String,
    #[serde(rename = "isNegative", default)]
    pub is_brand_risk: bool,
}

/// 1回のフェッチで得られるバッチ
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawContentBatch {
    #[serde(default)]
    pub chat_messages: Vec<RawChatMessage>,
    #[serde(rename = "discordAlerts", default)]
    pub alerts: Vec<RawAlert>,
    #[serde(rename = "socialPosts", default)]
    pub posts: Vec<RawPost>,
}

impl RawContentBatch {
    pub fn is_empty(&self) -> bool {
        self.chat_messages.is_empty() && self.alerts.is_empty() && self.posts.is_empty()
    }

    pub fn total_items(&self) -> usize {
        self.chat_messages.len() + self.alerts.len() + self.posts.len()
    }
}

/// フェッチ要求のパラメータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    /// 現在のハイプ値
    pub hype: u8,
    /// 要求件数の目安（スケーリングはソース側の判断）
    pub batch_size: usize,
}
