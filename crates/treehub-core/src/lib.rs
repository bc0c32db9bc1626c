//! # treehub-core
//!
//! Core crate for TreeHub. Contains the collaborator traits consumed by the
//! tree mutation engine, configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TreeHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
