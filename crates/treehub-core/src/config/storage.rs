//! Physical matter storage configuration.

use serde::{Deserialize, Serialize};

/// Storage configuration for the local matter tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory under which every user's tree is materialized.
    #[serde(default = "default_matter_root")]
    pub matter_root: String,
    /// Maximum length of a single matter name.
    #[serde(default = "default_name_max_length")]
    pub name_max_length: usize,
    /// Maximum directory nesting depth, in path segments.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            matter_root: default_matter_root(),
            name_max_length: default_name_max_length(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_matter_root() -> String {
    "./data/matter".to_string()
}

fn default_name_max_length() -> usize {
    200
}

fn default_max_depth() -> usize {
    32
}
