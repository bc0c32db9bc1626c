//! Physical storage trait for the on-disk matter tree.

use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading and writing file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for the physical storage collaborator.
///
/// Every path is a `/`-delimited key relative to the provider root. The
/// tree mutation engine never touches the filesystem except through this
/// trait. `rename` must be atomic when both keys live on the same volume.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Return the absolute location a key resolves to.
    fn absolute(&self, path: &str) -> PathBuf;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read a file into memory as a complete byte vector.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Write a byte stream to a file at the given path, returning the
    /// number of bytes written.
    async fn write_stream(&self, path: &str, stream: ByteStream) -> AppResult<u64>;

    /// Delete a file at the given path. Missing files are not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Delete a directory and all its contents recursively.
    async fn delete_dir(&self, path: &str) -> AppResult<()>;

    /// Copy a file from one path to another, duplicating its full content.
    async fn copy(&self, from: &str, to: &str) -> AppResult<()>;

    /// Move (rename) a file or directory from one path to another.
    async fn rename(&self, from: &str, to: &str) -> AppResult<()>;

    /// Check whether a file or directory exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Check whether the given path is a directory.
    async fn is_dir(&self, path: &str) -> AppResult<bool>;

    /// Create a directory (and any missing parents). Idempotent.
    async fn create_dir(&self, path: &str) -> AppResult<()>;
}
