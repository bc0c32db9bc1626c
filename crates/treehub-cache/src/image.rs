//! Derived-image artifact cache.
//!
//! Each artifact (a resized or cropped rendition of a file) is recorded as
//! a JSON [`ImageCacheEntry`] under a key built from the file's identifier
//! and the processing mode. Every artifact of a file shares one key prefix,
//! which is what [`ImageCacheService::delete_by_matter_id`] purges.

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use treehub_core::result::AppResult;
use treehub_core::traits::{CacheProvider, ImageCacheInvalidator};
use treehub_entity::image_cache::ImageCacheEntry;

use crate::keys;
use crate::provider::CacheManager;

/// Records and invalidates derived-image artifacts.
#[derive(Debug, Clone)]
pub struct ImageCacheService {
    cache: CacheManager,
}

impl ImageCacheService {
    /// Create a new image cache service.
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    /// Record an artifact, replacing any previous one with the same mode.
    pub async fn put(&self, entry: &ImageCacheEntry) -> AppResult<()> {
        let key = keys::image_entry(entry.matter_id, &entry.mode);
        let value = serde_json::to_string(entry)?;
        self.cache.set_default(&key, &value).await?;
        debug!(matter_id = %entry.matter_id, mode = %entry.mode, "Cached image artifact");
        Ok(())
    }

    /// Look up the artifact of `matter_id` produced by `mode`.
    pub async fn get(&self, matter_id: Uuid, mode: &str) -> AppResult<Option<ImageCacheEntry>> {
        match self.cache.get(&keys::image_entry(matter_id, mode)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ImageCacheInvalidator for ImageCacheService {
    async fn delete_by_matter_id(&self, matter_id: Uuid) -> AppResult<u64> {
        let removed = self
            .cache
            .delete_pattern(&keys::image_pattern(matter_id))
            .await?;
        if removed > 0 {
            info!(matter_id = %matter_id, removed, "Invalidated image cache");
        }
        Ok(removed)
    }
}
