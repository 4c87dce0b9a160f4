//! Custom Axum extractors.

pub mod auth;
pub mod json;

pub use auth::AuthEmployee;
pub use json::ValidatedJson;
