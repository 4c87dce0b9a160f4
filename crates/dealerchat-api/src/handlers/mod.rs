//! Route handlers organized by domain.

pub mod chat;
pub mod health;
pub mod notification;
pub mod ws;

use std::str::FromStr;

use dealerchat_core::error::AppError;

/// Parse a path identifier, reporting a malformed value as a validation error.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid {what} ID: '{raw}'")))
}
