//! # treehub-database
//!
//! Metadata repository for TreeHub: the [`MatterRepository`] contract,
//! a PostgreSQL implementation, an in-process implementation, and
//! connection pool management.
//!
//! Repositories are pure data access. They enforce the sibling-name
//! uniqueness constraint (as a conflict error) but no other business rule.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{MatterRepository, MemoryMatterRepository, PgMatterRepository};
