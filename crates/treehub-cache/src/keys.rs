//! Cache key builders for TreeHub cache entries.

use uuid::Uuid;

/// Prefix applied to all TreeHub cache keys.
const PREFIX: &str = "treehub";

/// Cache key of one derived-image artifact of a file.
pub fn image_entry(matter_id: Uuid, mode: &str) -> String {
    format!("{PREFIX}:image:{matter_id}:{mode}")
}

/// Pattern matching every derived-image artifact of a file.
pub fn image_pattern(matter_id: Uuid) -> String {
    format!("{PREFIX}:image:{matter_id}:*")
}
