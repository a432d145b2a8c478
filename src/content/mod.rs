pub mod buffer; // 種類別FIFOキュー
pub mod http;
pub mod models; // コンテンツソースの生データ
pub mod normalize;
pub mod refill; // シングルフライト制御
pub mod replay;
pub mod source;

pub use buffer::{BufferedItem, ContentBuffer, ContentKind};
pub use http::HttpContentSource;
pub use models::{FetchRequest, RawAlert, RawChatMessage, RawContentBatch, RawPost};
pub use normalize::{ContentNormalizer, NormalizedBatch};
pub use refill::{RefillGuard, RefillPermit};
pub use replay::ReplayContentSource;
pub use source::{generate_batch, ContentSource, MockContentSource};

use std::sync::Arc;
use std::time::Duration;

use crate::config::ContentSourceConfig;
use crate::error::LivemodResult;

/// 設定からコンテンツソースを構築
pub fn build_content_source(
    config: &ContentSourceConfig,
    seed: Option<u64>,
) -> LivemodResult<Arc<dyn ContentSource>> {
    let source: Arc<dyn ContentSource> = match config {
        ContentSourceConfig::Mock {
            latency_ms,
            failure_rate,
        } => Arc::new(
            MockContentSource::new(seed)
                .with_latency(Duration::from_millis(*latency_ms))
                .with_failure_rate(*failure_rate),
        ),
        ContentSourceConfig::Http {
            endpoint,
            request_timeout_ms,
        } => Arc::new(HttpContentSource::new(
            endpoint.clone(),
            Duration::from_millis(*request_timeout_ms),
        )?),
        ContentSourceConfig::Replay { path } => Arc::new(ReplayContentSource::from_file(path)?),
    };

    tracing::info!("🔌 Content source ready: {}", source.name());
    Ok(source)
}
