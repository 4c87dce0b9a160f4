//! Route definitions for the DealerChat HTTP API.
//!
//! REST routes are mounted under `/api`; WebSocket upgrades live under
//! `/ws`. The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the route tree and attach the state.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(chat_routes())
        .merge(notification_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes())
        .with_state(state)
}

/// Chat session administration
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/chat/sessions",
            post(handlers::chat::open_session).get(handlers::chat::list_sessions),
        )
        .route("/chat/sessions/{id}", get(handlers::chat::get_session))
        .route(
            "/chat/sessions/{id}/close",
            put(handlers::chat::close_session),
        )
        .route(
            "/chat/session-by-form/{form_instance_id}",
            get(handlers::chat::session_by_form),
        )
}

/// Notification push
fn notification_routes() -> Router<AppState> {
    Router::new().route(
        "/notifications/dispatch",
        post(handlers::notification::dispatch),
    )
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// WebSocket upgrades
fn ws_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/ws/chat/{session_id}/{role}",
            get(handlers::ws::chat_ws_handler),
        )
        .route(
            "/ws/notifications",
            get(handlers::ws::notification_ws_handler),
        )
}
