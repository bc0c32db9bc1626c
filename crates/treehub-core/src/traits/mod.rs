//! Collaborator traits defined in `treehub-core` and implemented by other crates.

pub mod cache;
pub mod fetch;
pub mod image_cache;
pub mod storage;

pub use cache::CacheProvider;
pub use fetch::RemoteFetcher;
pub use image_cache::ImageCacheInvalidator;
pub use storage::{ByteStream, StorageProvider};
