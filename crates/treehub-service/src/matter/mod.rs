//! Matter tree operations.

pub mod atomic;
pub mod detail;
pub mod relocate;
pub mod service;
pub mod validate;

pub use detail::DetailAssembler;
pub use service::MatterService;
