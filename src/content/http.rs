//! HTTP経由のコンテンツ生成サービスクライアント

use async_trait::async_trait;
use std::time::Duration;

use super::models::{FetchRequest, RawContentBatch};
use super::source::ContentSource;
use crate::error::ContentSourceError;

/// `GET {endpoint}?hype=<n>&count=<n>` でバッチを取得するソース
pub struct HttpContentSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpContentSource {
    pub fn new(
        endpoint: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, ContentSourceError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("livemod/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_batch(
        &self,
        request: FetchRequest,
    ) -> Result<RawContentBatch, ContentSourceError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            hype = request.hype,
            count = request.batch_size,
            "📡 Requesting content batch"
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("hype", request.hype.to_string()),
                ("count", request.batch_size.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentSourceError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let batch: RawContentBatch = serde_json::from_slice(&body)?;

        tracing::debug!(
            items = batch.total_items(),
            bytes = body.len(),
            "📬 Content batch received"
        );

        Ok(batch)
    }

    fn name(&self) -> &str {
        "http"
    }
}
