//! コンテンツバッファ
//!
//! 種類ごとに独立したFIFOキュー。フェッチ結果を受け取った順に積み、
//! ティックが古いものから取り出す。重複排除は行わない。

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::game::models::{Alert, ChatMessage, SocialPost};

/// バッファのキュー種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Chat,
    Alert,
    Post,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Chat => "chat",
            ContentKind::Alert => "alert",
            ContentKind::Post => "post",
        }
    }
}

/// バッファに積めるアイテム
pub trait BufferedItem: Sized {
    const KIND: ContentKind;

    fn queue(buffer: &mut ContentBuffer) -> &mut VecDeque<Self>;
}

impl BufferedItem for ChatMessage {
    const KIND: ContentKind = ContentKind::Chat;

    fn queue(buffer: &mut ContentBuffer) -> &mut VecDeque<Self> {
        &mut buffer.chat
    }
}

impl BufferedItem for Alert {
    const KIND: ContentKind = ContentKind::Alert;

    fn queue(buffer: &mut ContentBuffer) -> &mut VecDeque<Self> {
        &mut buffer.alerts
    }
}

impl BufferedItem for SocialPost {
    const KIND: ContentKind = ContentKind::Post;

    fn queue(buffer: &mut ContentBuffer) -> &mut VecDeque<Self> {
        &mut buffer.posts
    }
}

/// 種類別キューの集合
#[derive(Debug, Clone, Default)]
pub struct ContentBuffer {
    chat: VecDeque<ChatMessage>,
    alerts: VecDeque<Alert>,
    posts: VecDeque<SocialPost>,
}

impl ContentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// バッチを受け取った順のまま末尾に追加
    pub fn enqueue_batch<T: BufferedItem>(&mut self, items: impl IntoIterator<Item = T>) -> usize {
        let queue = T::queue(self);
        let before = queue.len();
        queue.extend(items);
        let added = queue.len() - before;
        tracing::trace!(
            kind = T::KIND.as_str(),
            added,
            queued = queue.len(),
            "📥 [BUFFER] Enqueued"
        );
        added
    }

    /// 最も古いアイテムを取り出す（空なら `None`）
    pub fn dequeue<T: BufferedItem>(&mut self) -> Option<T> {
        let item = T::queue(self).pop_front();
        if item.is_none() {
            tracing::trace!(kind = T::KIND.as_str(), "📭 [BUFFER] Queue empty");
        }
        item
    }

    pub fn size(&self, kind: ContentKind) -> usize {
        match kind {
            ContentKind::Chat => self.chat.len(),
            ContentKind::Alert => self.alerts.len(),
            ContentKind::Post => self.posts.len(),
        }
    }

    pub fn is_empty(&self, kind: ContentKind) -> bool {
        self.size(kind) == 0
    }

    /// 全キューを空にする
    pub fn clear(&mut self) {
        self.chat.clear();
        self.alerts.clear();
        self.posts.clear();
    }

    /// (chat, alert, post) の件数
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.chat.len(), self.alerts.len(), self.posts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::models::{MessageCategory, Severity};

    fn chat(id: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            author: "viewer".to_string(),
            content: format!("message {}", id),
            category: MessageCategory::Normal,
            is_moderator: false,
            avatar_url: String::new(),
            created_at: chrono::Utc::now(),
        }
    }

    fn alert(id: &str) -> Alert {
        Alert {
            id: id.to_string(),
            channel: "#general".to_string(),
            user: "someone".to_string(),
            issue: "spam links".to_string(),
            severity: Severity::Low,
            resolved: false,
        }
    }

    #[test]
    fn test_fifo_order_preserved_across_batches() {
        let mut buffer = ContentBuffer::new();
        buffer.enqueue_batch(vec![chat("1"), chat("2")]);
        buffer.enqueue_batch(vec![chat("3")]);

        let ids: Vec<String> = std::iter::from_fn(|| buffer.dequeue::<ChatMessage>())
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_empty_dequeue_is_none() {
        let mut buffer = ContentBuffer::new();
        assert!(buffer.dequeue::<Alert>().is_none());
        assert!(buffer.dequeue::<SocialPost>().is_none());
    }

    #[test]
    fn test_queues_are_independent() {
        let mut buffer = ContentBuffer::new();
        buffer.enqueue_batch(vec![chat("c1")]);
        buffer.enqueue_batch(vec![alert("a1"), alert("a2")]);

        assert_eq!(buffer.size(ContentKind::Chat), 1);
        assert_eq!(buffer.size(ContentKind::Alert), 2);
        assert_eq!(buffer.size(ContentKind::Post), 0);

        buffer.dequeue::<Alert>();
        assert_eq!(buffer.sizes(), (1, 1, 0));
    }

    #[test]
    fn test_item_kind_matches_its_queue() {
        let mut buffer = ContentBuffer::new();
        buffer.enqueue_batch(vec![alert("a1"), alert("a2")]);

        assert_eq!(buffer.size(<Alert as BufferedItem>::KIND), 2);
        assert_eq!(buffer.size(<ChatMessage as BufferedItem>::KIND), 0);
        assert_eq!(<SocialPost as BufferedItem>::KIND, ContentKind::Post);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut buffer = ContentBuffer::new();
        let added = buffer.enqueue_batch(vec![chat("same"), chat("same")]);
        assert_eq!(added, 2);
        assert_eq!(buffer.size(ContentKind::Chat), 2);

        buffer.clear();
        assert!(buffer.is_empty(ContentKind::Chat));
    }
}
