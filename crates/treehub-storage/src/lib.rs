//! # treehub-storage
//!
//! The physical side of a matter tree: a local filesystem
//! [`StorageProvider`](treehub_core::traits::StorageProvider), the
//! [`PathResolver`] mapping matters to storage keys, and the
//! [`HttpFetcher`] used to crawl remote URLs.

pub mod paths;
pub mod providers;
pub mod remote;

pub use paths::PathResolver;
pub use providers::LocalStorageProvider;
pub use remote::HttpFetcher;
