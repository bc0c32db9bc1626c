//! Core type definitions used across the TreeHub workspace.

pub mod size;

pub use size::human_size;
