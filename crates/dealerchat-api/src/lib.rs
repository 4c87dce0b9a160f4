//! # dealerchat-api
//!
//! HTTP API layer for DealerChat built on Axum.
//!
//! Provides the chat-session REST endpoints, the notification dispatch
//! endpoint, both WebSocket upgrades, middleware (CORS, request logging),
//! extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, init_logging, run_server};
pub use error::ApiError;
pub use state::AppState;
