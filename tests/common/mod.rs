//! 統合テスト共通のヘルパー

#![allow(dead_code)]

use async_trait::async_trait;
use livemod::content::{
    ContentSource, FetchRequest, RawAlert, RawChatMessage, RawContentBatch, RawPost,
};
use livemod::game::{MessageCategory, Severity};
use livemod::{ContentSourceError, GameConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// 確率ゲートを閉じ、周期ティックが実質走らない設定
pub fn manual_config() -> GameConfig {
    GameConfig {
        tick_interval_ms: 3_600_000,
        alert_probability: 0.0,
        post_probability: 0.0,
        task_probability: 0.0,
        seed: Some(99),
        ..Default::default()
    }
}

/// 生成済みタスクを実行させる
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

pub fn chat_batch(count: usize, category: MessageCategory) -> RawContentBatch {
    RawContentBatch {
        chat_messages: (0..count)
            .map(|i| RawChatMessage {
                username: format!("viewer{}", i),
                content: format!("message {}", i),
                category,
                is_mod: None,
            })
            .collect(),
        ..Default::default()
    }
}

pub fn alert_batch(count: usize) -> RawContentBatch {
    RawContentBatch {
        alerts: (0..count)
            .map(|i| RawAlert {
                channel: "#reports".to_string(),
                user: format!("reporter{}", i),
                issue: "raid in progress".to_string(),
                severity: Severity::High,
            })
            .collect(),
        ..Default::default()
    }
}

pub fn post_batch(count: usize, is_brand_risk: bool) -> RawContentBatch {
    RawContentBatch {
        posts: (0..count)
            .map(|i| RawPost {
                username: format!("poster {}", i),
                handle: None,
                content: "hot take".to_string(),
                is_brand_risk,
            })
            .collect(),
        ..Default::default()
    }
}

/// 呼び出しを数え、テスト側が許可するまで応答しないソース
pub struct GatedSource {
    calls: AtomicUsize,
    gate: Semaphore,
    batch: RawContentBatch,
}

impl GatedSource {
    pub fn new(batch: RawContentBatch) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: Semaphore::new(0),
            batch,
        }
    }

    /// 保留中（およびこれからの）フェッチをn件完了させる
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for GatedSource {
    async fn fetch_batch(
        &self,
        _request: FetchRequest,
    ) -> Result<RawContentBatch, ContentSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| ContentSourceError::Unavailable(e.to_string()))?;
        permit.forget();
        Ok(self.batch.clone())
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// 常に失敗するソース
pub struct FailingSource {
    calls: AtomicUsize,
}

impl FailingSource {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for FailingSource {
    async fn fetch_batch(
        &self,
        _request: FetchRequest,
    ) -> Result<RawContentBatch, ContentSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ContentSourceError::Unavailable("generator offline".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
