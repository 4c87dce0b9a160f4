//! Convenience result type alias for DealerChat.

use crate::error::AppError;

/// A specialized `Result` type for DealerChat operations.
pub type AppResult<T> = Result<T, AppError>;
