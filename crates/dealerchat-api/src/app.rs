//! Application builder: wires router, middleware, and state into an Axum
//! app, and runs it until shutdown.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dealerchat_core::config::{AppConfig, LoggingConfig};
use dealerchat_core::error::AppError;
use dealerchat_database::{ChatStore, DatabasePool};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Initialize tracing/logging. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the DealerChat server against PostgreSQL until a shutdown signal.
pub async fn run_server(config: AppConfig, database: DatabasePool) -> Result<(), AppError> {
    info!("Starting DealerChat server...");

    // ── Step 1: Chat store ───────────────────────────────────────
    let store: Arc<dyn ChatStore> = Arc::new(database.chat_store());

    // ── Step 2: State + realtime engine ──────────────────────────
    let state = AppState::new(config.clone(), store, Some(database.clone()))?;
    let engine = state.realtime.clone();

    // ── Step 3: Bind and serve ───────────────────────────────────
    let app = build_app(state);
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("DealerChat server listening on {}", addr);

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let shutdown_engine = engine.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, closing realtime connections...");
        // Open sockets would otherwise hold graceful shutdown forever.
        shutdown_engine.shutdown();
    });

    // ── Step 4: Bounded graceful shutdown ────────────────────────
    let serve = async {
        server
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))
    };
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => result?,
        _ = async {
            engine.shutdown_token().cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
        }
    }

    database.close().await;
    info!("DealerChat server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
