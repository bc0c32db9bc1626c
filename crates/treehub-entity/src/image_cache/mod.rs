//! Derived-image cache entities.

pub mod model;

pub use model::ImageCacheEntry;
