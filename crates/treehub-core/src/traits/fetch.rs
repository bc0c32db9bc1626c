//! Remote fetch trait used by crawl.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::traits::storage::ByteStream;

/// Obtains a readable byte stream for a remote URL.
#[async_trait]
pub trait RemoteFetcher: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch `url` and return its response body as a stream.
    async fn fetch(&self, url: &str) -> AppResult<ByteStream>;
}
