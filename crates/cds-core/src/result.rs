//! Convenience result type alias for CDS.

use crate::error::AppError;

/// A specialized `Result` type for CDS operations.
pub type AppResult<T> = Result<T, AppError>;
