//! Child listing filters.

use serde::{Deserialize, Serialize};

use super::model::Matter;

/// Which kinds of matter a listing should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatterKind {
    /// Files and directories.
    #[default]
    Any,
    /// Directories only.
    Directory,
    /// Files only.
    File,
}

/// Optional narrowing applied when listing a directory's children.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatterFilter {
    /// Kind restriction.
    #[serde(default)]
    pub kind: MatterKind,
    /// Case-insensitive substring the name must contain.
    #[serde(default)]
    pub name_contains: Option<String>,
}

impl MatterFilter {
    /// A filter that accepts every child.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter that accepts directories only.
    pub fn directories() -> Self {
        Self {
            kind: MatterKind::Directory,
            name_contains: None,
        }
    }

    /// The `is_directory` value this filter pins, if any.
    pub fn directory_flag(&self) -> Option<bool> {
        match self.kind {
            MatterKind::Any => None,
            MatterKind::Directory => Some(true),
            MatterKind::File => Some(false),
        }
    }

    /// Whether `matter` passes this filter.
    pub fn matches(&self, matter: &Matter) -> bool {
        if let Some(flag) = self.directory_flag() {
            if matter.is_directory != flag {
                return false;
            }
        }
        match &self.name_contains {
            Some(needle) => matter
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
