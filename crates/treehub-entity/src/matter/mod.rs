//! Matter (file or directory) domain entities.

pub mod filter;
pub mod model;

pub use filter::{MatterFilter, MatterKind};
pub use model::{
    CreateMatter, MATTER_NAME_MAX_DEPTH, MATTER_NAME_MAX_LENGTH, MATTER_ROOT, Matter,
    MatterDetail,
};
