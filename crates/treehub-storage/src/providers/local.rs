//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use treehub_core::error::{AppError, ErrorKind};
use treehub_core::result::AppResult;
use treehub_core::traits::{ByteStream, StorageProvider};

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored matters.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The directory every key resolves under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path within the root. Only normal segments are
    /// kept, so a key can never climb out of the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        for component in Path::new(path.trim_start_matches('/')).components() {
            if let Component::Normal(segment) = component {
                full.push(segment);
            }
        }
        full
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    fn absolute(&self, path: &str) -> PathBuf {
        self.resolve(path)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let data = fs::read(self.resolve(path)).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {path}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to read file: {path}"), e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn write_stream(&self, path: &str, mut stream: ByteStream) -> AppResult<u64> {
        let full_path = self.resolve(path);
        self.ensure_parent(&full_path).await?;

        let mut file = fs::File::create(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to create file: {path}"), e)
        })?;

        let mut total_bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| AppError::with_source(ErrorKind::Storage, "Stream read error", e))?;
            total_bytes += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write chunk", e)
            })?;
        }

        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush file", e))?;

        debug!(path, bytes = total_bytes, "Wrote file from stream");
        Ok(total_bytes)
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        match fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete file: {path}"),
                e,
            )),
        }
    }

    async fn delete_dir(&self, path: &str) -> AppResult<()> {
        match fs::remove_dir_all(self.resolve(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete directory: {path}"),
                e,
            )),
        }
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let to_path = self.resolve(to);
        self.ensure_parent(&to_path).await?;

        let bytes = fs::copy(self.resolve(from), &to_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to copy {from} -> {to}"), e)
        })?;
        debug!(from, to, bytes, "Copied file");
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let to_path = self.resolve(to);
        self.ensure_parent(&to_path).await?;

        fs::rename(self.resolve(from), &to_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to rename {from} -> {to}"),
                e,
            )
        })?;
        debug!(from, to, "Renamed path");
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        fs::try_exists(self.resolve(path)).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to stat: {path}"), e)
        })
    }

    async fn is_dir(&self, path: &str) -> AppResult<bool> {
        match fs::metadata(self.resolve(path)).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat: {path}"),
                e,
            )),
        }
    }

    async fn create_dir(&self, path: &str) -> AppResult<()> {
        fs::create_dir_all(self.resolve(path)).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {path}"),
                e,
            )
        })
    }
}
