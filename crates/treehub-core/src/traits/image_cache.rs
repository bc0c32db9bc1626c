//! Derived-image cache invalidation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Invalidates cached derived-image artifacts for a file.
///
/// Cache entries are keyed on a file's identity and path, so the tree
/// mutation engine calls this whenever a file moves, is renamed, sits
/// under a relocated directory, or is deleted.
#[async_trait]
pub trait ImageCacheInvalidator: Send + Sync + std::fmt::Debug + 'static {
    /// Remove every cached artifact attached to `matter_id`. Returns the
    /// number of artifacts removed.
    async fn delete_by_matter_id(&self, matter_id: Uuid) -> AppResult<u64>;
}
