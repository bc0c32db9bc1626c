//! Mapping from matters to physical storage locations.
//!
//! Every user owns the directory `{matter_root}/{username}/root`; a matter
//! lives at that directory joined with its relative path. Storage keys
//! handed to a [`StorageProvider`] are relative to `matter_root`.

use std::path::PathBuf;

use tracing::debug;

use treehub_core::config::StorageConfig;
use treehub_core::error::AppError;
use treehub_core::result::AppResult;
use treehub_core::traits::StorageProvider;
use treehub_entity::matter::Matter;

/// Name of the per-user directory holding the virtual root.
const ROOT_DIR: &str = "root";

/// Resolves matters and users to storage keys and absolute paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    matter_root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for the given matter root.
    pub fn new(matter_root: impl Into<PathBuf>) -> Self {
        Self {
            matter_root: matter_root.into(),
        }
    }

    /// Create a resolver from storage configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.matter_root)
    }

    /// The directory all user roots live under.
    pub fn matter_root(&self) -> &PathBuf {
        &self.matter_root
    }

    /// Storage key of a user's virtual root.
    pub fn user_root_key(&self, username: &str) -> String {
        format!("{username}/{ROOT_DIR}")
    }

    /// Storage key of an arbitrary relative path inside a user's tree.
    pub fn key_for(&self, username: &str, relative_path: &str) -> String {
        format!("{username}/{ROOT_DIR}{relative_path}")
    }

    /// Storage key of a matter.
    pub fn storage_key(&self, matter: &Matter) -> String {
        self.key_for(&matter.owner_name, &matter.relative_path)
    }

    /// Absolute directory of a user's virtual root.
    pub fn user_root(&self, username: &str) -> PathBuf {
        self.matter_root.join(username).join(ROOT_DIR)
    }

    /// Absolute on-disk location of a matter.
    pub fn absolute_path(&self, matter: &Matter) -> PathBuf {
        let mut path = self.user_root(&matter.owner_name);
        for segment in matter.relative_path.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path
    }

    /// Create the user's root directory if it does not exist yet.
    pub async fn ensure_user_root(
        &self,
        storage: &dyn StorageProvider,
        username: &str,
    ) -> AppResult<String> {
        if username.is_empty()
            || username == "."
            || username == ".."
            || username.contains(['/', '\\'])
        {
            return Err(AppError::validation(format!(
                "Username '{username}' cannot be used as a storage directory"
            )));
        }

        let key = self.user_root_key(username);
        if !storage.is_dir(&key).await? {
            storage.create_dir(&key).await?;
            debug!(username, key = %key, "Created user root");
        }
        Ok(key)
    }
}
