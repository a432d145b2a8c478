//! 生データから表示用エンティティへの正規化
//!
//! ID採番、アバターURL・ハンドルの既定値、モデレーター判定をここで行う。

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashSet;

use super::models::{RawAlert, RawChatMessage, RawContentBatch, RawPost};
use crate::game::constants::{AVATAR_URL_BASE, MODERATORS};
use crate::game::models::{new_entity_id, Alert, ChatMessage, SocialPost};

/// 正規化済みバッチ
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub chat: Vec<ChatMessage>,
    pub alerts: Vec<Alert>,
    pub posts: Vec<SocialPost>,
}

impl NormalizedBatch {
    pub fn total_items(&self) -> usize {
        self.chat.len() + self.alerts.len() + self.posts.len()
    }
}

/// 正規化器
#[derive(Debug, Clone)]
pub struct ContentNormalizer {
    moderators: HashSet<String>,
}

impl Default for ContentNormalizer {
    fn default() -> Self {
        Self::new(MODERATORS.iter().copied())
    }
}

impl ContentNormalizer {
    pub fn new<'a>(moderators: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            moderators: moderators.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn is_moderator(&self, username: &str) -> bool {
        self.moderators.contains(username)
    }

    pub fn normalize_chat(&self, raw: RawChatMessage, now: DateTime<Utc>) -> ChatMessage {
        let is_moderator = self.is_moderator(&raw.username) || raw.is_mod.unwrap_or(false);
        ChatMessage {
            id: new_entity_id(),
            avatar_url: avatar_url(&raw.username),
            author: raw.username,
            content: raw.content,
            category: raw.category,
            is_moderator,
            created_at: now,
        }
    }

    pub fn normalize_alert(&self, raw: RawAlert) -> Alert {
        Alert {
            id: new_entity_id(),
            channel: raw.channel,
            user: raw.user,
            issue: raw.issue,
            severity: raw.severity,
            resolved: false,
        }
    }

    pub fn normalize_post<R: Rng + ?Sized>(&self, raw: RawPost, rng: &mut R) -> SocialPost {
        let handle = raw
            .handle
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| default_handle(&raw.username));
        SocialPost {
            id: new_entity_id(),
            author: raw.username,
            handle,
            content: raw.content,
            likes: rng.gen_range(0..500),
            is_brand_risk: raw.is_brand_risk,
            replied: false,
        }
    }

    /// バッチ全体を正規化（各種類の順序は維持）
    pub fn normalize_batch<R: Rng + ?Sized>(
        &self,
        batch: RawContentBatch,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> NormalizedBatch {
        NormalizedBatch {
            chat: batch
                .chat_messages
                .into_iter()
                .map(|raw| self.normalize_chat(raw, now))
                .collect(),
            alerts: batch
                .alerts
                .into_iter()
                .map(|raw| self.normalize_alert(raw))
                .collect(),
            posts: batch
                .posts
                .into_iter()
                .map(|raw| self.normalize_post(raw, rng))
                .collect(),
        }
    }
}

/// 投稿者名からアバターURLを生成
pub fn avatar_url(username: &str) -> String {
    format!("{}/{}/50", AVATAR_URL_BASE, username)
}

/// 投稿者名から既定のハンドルを生成（空白を除去して@を付与）
pub fn default_handle(username: &str) -> String {
    let compact: String = username.chars().filter(|c| !c.is_whitespace()).collect();
    format!("@{}", compact)
}
