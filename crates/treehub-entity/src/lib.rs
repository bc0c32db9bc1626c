//! # treehub-entity
//!
//! Domain entity models for TreeHub. Database entities derive
//! `sqlx::FromRow` in addition to `Debug`, `Clone`, `Serialize` and
//! `Deserialize`.

pub mod image_cache;
pub mod matter;
pub mod user;
