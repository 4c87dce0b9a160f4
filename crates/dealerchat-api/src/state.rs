//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use dealerchat_auth::{JwtDecoder, PrincipalVerifier};
use dealerchat_core::config::AppConfig;
use dealerchat_core::result::AppResult;
use dealerchat_database::{ChatStore, DatabasePool};
use dealerchat_realtime::RealtimeEngine;

/// Shared application state passed to all Axum handlers via `State`.
///
/// Everything inside is reference-counted, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Database pool. Absent when running on the in-memory store.
    pub database: Option<DatabasePool>,
    /// Verifies Bearer and WebSocket credentials.
    pub verifier: Arc<dyn PrincipalVerifier>,
    /// Realtime engine: registry, chat, sessions, notifications.
    pub realtime: RealtimeEngine,
    /// When the process started serving.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire the state from configuration and a chat store.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ChatStore>,
        database: Option<DatabasePool>,
    ) -> AppResult<Self> {
        let verifier: Arc<dyn PrincipalVerifier> = Arc::new(JwtDecoder::new(&config.auth));
        Self::with_verifier(config, store, database, verifier)
    }

    /// Wire the state with an explicit credential verifier.
    pub fn with_verifier(
        config: AppConfig,
        store: Arc<dyn ChatStore>,
        database: Option<DatabasePool>,
        verifier: Arc<dyn PrincipalVerifier>,
    ) -> AppResult<Self> {
        let realtime = RealtimeEngine::new(
            config.realtime.clone(),
            config.chat.clone(),
            store,
            Arc::clone(&verifier),
        )?;

        Ok(Self {
            config: Arc::new(config),
            database,
            verifier,
            realtime,
            started_at: Utc::now(),
        })
    }
}
