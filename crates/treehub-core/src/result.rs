//! Convenience result type alias for TreeHub.

use crate::error::AppError;

/// A specialized `Result` type for TreeHub operations.
pub type AppResult<T> = Result<T, AppError>;
