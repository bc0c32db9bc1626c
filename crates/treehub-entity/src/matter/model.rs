//! Matter entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::User;

/// Parent identifier of top-level matters, and the identifier of the
/// synthesized root directory itself.
pub const MATTER_ROOT: Uuid = Uuid::nil();

/// Maximum length of a matter name.
pub const MATTER_NAME_MAX_LENGTH: usize = 200;

/// Maximum directory nesting depth, in path segments.
pub const MATTER_NAME_MAX_DEPTH: usize = 32;

/// A file or directory in a user's virtual tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Matter {
    /// Unique matter identifier.
    pub id: Uuid,
    /// Containing directory, or [`MATTER_ROOT`] for top-level matters.
    pub parent_id: Uuid,
    /// The owning user.
    pub owner_id: Uuid,
    /// The owning user's name (denormalized; selects the storage root).
    pub owner_name: String,
    /// Whether this matter is a directory.
    pub is_directory: bool,
    /// Leaf name, unique among siblings of the same kind.
    pub name: String,
    /// Path from the owner's virtual root, e.g. `/docs/report.pdf`.
    pub relative_path: String,
    /// Size in bytes. Not maintained for directories.
    pub size: i64,
    /// Whether the matter is private.
    pub privacy: bool,
    /// Content checksum, computed outside the tree mutation engine.
    pub content_hash: Option<String>,
    /// When the matter was created.
    pub created_at: DateTime<Utc>,
    /// When the matter was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Matter {
    /// Synthesize the root directory of `user`. The root has no stored record.
    pub fn root(user: &User) -> Self {
        let now = Utc::now();
        Self {
            id: MATTER_ROOT,
            parent_id: MATTER_ROOT,
            owner_id: user.id,
            owner_name: user.username.clone(),
            is_directory: true,
            name: "root".to_string(),
            relative_path: String::new(),
            size: 0,
            privacy: false,
            content_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is the synthesized root directory.
    pub fn is_root(&self) -> bool {
        self.id == MATTER_ROOT
    }

    /// Path a child named `name` would occupy under this matter.
    pub fn child_path(&self, name: &str) -> String {
        format!("{}/{}", self.relative_path, name)
    }

    /// Number of path segments below the virtual root (root is 0).
    pub fn depth(&self) -> usize {
        self.relative_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .count()
    }

    /// Relative path of the containing directory (`""` for top-level matters).
    pub fn parent_path(&self) -> &str {
        match self.relative_path.rfind('/') {
            Some(idx) => &self.relative_path[..idx],
            None => "",
        }
    }
}

/// Data required to create a new matter record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMatter {
    /// Containing directory.
    pub parent_id: Uuid,
    /// The owning user.
    pub owner_id: Uuid,
    /// The owning user's name.
    pub owner_name: String,
    /// Whether this matter is a directory.
    pub is_directory: bool,
    /// Leaf name.
    pub name: String,
    /// Path from the owner's virtual root.
    pub relative_path: String,
    /// Size in bytes.
    pub size: i64,
    /// Privacy flag.
    pub privacy: bool,
    /// Content checksum.
    pub content_hash: Option<String>,
}

impl CreateMatter {
    /// A public directory record named `name` under `parent`.
    pub fn directory(parent: &Matter, name: &str) -> Self {
        Self {
            parent_id: parent.id,
            owner_id: parent.owner_id,
            owner_name: parent.owner_name.clone(),
            is_directory: true,
            name: name.to_string(),
            relative_path: parent.child_path(name),
            size: 0,
            privacy: false,
            content_hash: None,
        }
    }
}

/// A matter together with its ancestor chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatterDetail {
    /// The matter itself.
    pub matter: Matter,
    /// Stored ancestors, root-most first. The synthesized root is not included.
    pub ancestors: Vec<Matter>,
}

impl MatterDetail {
    /// Identifiers of the matter and every stored ancestor, nearest first.
    pub fn lineage_ids(&self) -> Vec<Uuid> {
        std::iter::once(self.matter.id)
            .chain(self.ancestors.iter().rev().map(|m| m.id))
            .collect()
    }
}
