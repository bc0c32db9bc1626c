//! # treehub-cache
//!
//! Cache providers for TreeHub and the derived-image cache built on top
//! of them. The in-process provider uses [moka](https://crates.io/crates/moka);
//! the provider is selected at runtime from configuration.

pub mod image;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use image::ImageCacheService;
pub use provider::CacheManager;
