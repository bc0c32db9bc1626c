//! Image cache entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A derived-image artifact (resized or cropped rendition) of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCacheEntry {
    /// The source file.
    pub matter_id: Uuid,
    /// Processing mode that produced the artifact, e.g. `resize_fit_200_200`.
    pub mode: String,
    /// Where the artifact is stored.
    pub storage_path: String,
    /// Artifact size in bytes.
    pub size: i64,
    /// When the artifact was produced.
    pub created_at: DateTime<Utc>,
}

impl ImageCacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(
        matter_id: Uuid,
        mode: impl Into<String>,
        storage_path: impl Into<String>,
        size: i64,
    ) -> Self {
        Self {
            matter_id,
            mode: mode.into(),
            storage_path: storage_path.into(),
            size,
            created_at: Utc::now(),
        }
    }
}
