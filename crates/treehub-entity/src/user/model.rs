//! User entity model.
//!
//! Users are managed outside TreeHub; this is the slice of a user the
//! tree mutation engine needs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The acting user of a tree mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name; selects the user's storage root.
    pub username: String,
    /// Per-upload size limit in bytes. Negative means unlimited.
    pub size_limit: i64,
}

impl User {
    /// Create a user value.
    pub fn new(id: Uuid, username: impl Into<String>, size_limit: i64) -> Self {
        Self {
            id,
            username: username.into(),
            size_limit,
        }
    }

    /// Whether an upload of `bytes` exceeds this user's size limit.
    pub fn exceeds_limit(&self, bytes: u64) -> bool {
        self.size_limit >= 0 && bytes > self.size_limit as u64
    }
}
