//! # treehub-service
//!
//! The tree mutation engine. [`MatterService`] keeps the physical matter
//! tree and the metadata repository in agreement across create, upload,
//! move, copy, rename and delete. Its `atomic_*` entry points serialize
//! mutations per user through the [`UserLockManager`]; the plain variants
//! never lock and exist for composition by a lock holder.
//!
//! Collaborators are injected at construction time as `Arc<dyn Trait>`.

pub mod lock;
pub mod matter;

pub use lock::{UserLockGuard, UserLockManager};
pub use matter::{DetailAssembler, MatterService};
