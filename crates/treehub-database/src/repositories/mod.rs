//! Matter repository contract and implementations.

pub mod matter;
pub mod memory;

pub use matter::{MatterRepository, PgMatterRepository};
pub use memory::MemoryMatterRepository;
