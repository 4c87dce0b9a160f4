//! Health check handler.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = match &state.database {
        None => "in-memory",
        Some(db) => match db.ping().await {
            Ok(()) => "connected",
            Err(_) => "unreachable",
        },
    };
    let status = if database == "unreachable" { "degraded" } else { "ok" };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        database: database.to_string(),
        ws_connections: state.realtime.registry.connection_count(),
        metrics: state.realtime.metrics.snapshot(),
    }))
}
