//! HTTP fetcher used by crawl.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::StreamExt;
use tracing::debug;

use treehub_core::config::CrawlConfig;
use treehub_core::error::{AppError, ErrorKind};
use treehub_core::result::AppResult;
use treehub_core::traits::{ByteStream, RemoteFetcher};

/// Fetches remote URLs over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher from crawl configuration.
    pub fn new(config: &CrawlConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Failed to build HTTP client", e)
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> AppResult<ByteStream> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, format!("Failed to fetch {url}"), e)
            })?;

        debug!(url, status = %response.status(), "Fetched remote resource");
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other));
        Ok(Box::pin(stream))
    }
}
