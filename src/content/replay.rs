//! 記録済みバッチを再生するコンテンツソース

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;

use super::models::{FetchRequest, RawContentBatch};
use super::source::ContentSource;
use crate::error::{ContentSourceError, LivemodResult};
use crate::io::ndjson::{parse_ndjson_file, TimestampedEntry};

/// NDJSONに記録されたバッチを1フェッチ1件ずつ返す
///
/// 要求のハイプ値は無視する。記録が尽きたら `Exhausted` を返す。
pub struct ReplayContentSource {
    batches: Mutex<VecDeque<RawContentBatch>>,
}

impl ReplayContentSource {
    pub fn new(batches: impl IntoIterator<Item = RawContentBatch>) -> Self {
        Self {
            batches: Mutex::new(batches.into_iter().collect()),
        }
    }

    /// NDJSONファイルから読み込む
    pub fn from_file(path: impl AsRef<Path>) -> LivemodResult<Self> {
        let entries: Vec<TimestampedEntry<RawContentBatch>> = parse_ndjson_file(path.as_ref())?;
        tracing::info!(
            "📼 Loaded {} recorded batches from {}",
            entries.len(),
            path.as_ref().display()
        );
        Ok(Self::new(entries.into_iter().map(|entry| entry.data)))
    }

    /// 残りのバッチ数
    pub fn remaining(&self) -> usize {
        self.batches.lock().len()
    }
}

#[async_trait]
impl ContentSource for ReplayContentSource {
    async fn fetch_batch(
        &self,
        _request: FetchRequest,
    ) -> Result<RawContentBatch, ContentSourceError> {
        self.batches
            .lock()
            .pop_front()
            .ok_or(ContentSourceError::Exhausted)
    }

    fn name(&self) -> &str {
        "replay"
    }
}
