//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use dealerchat_auth::PrincipalVerifier;
use dealerchat_core::config::{ChatConfig, RealtimeConfig};
use dealerchat_core::result::AppResult;
use dealerchat_database::ChatStore;

use crate::chat::{ChatCoordinator, SessionLifecycle};
use crate::connection::ConnectionRegistry;
use crate::metrics::RealtimeMetrics;
use crate::notification::NotificationDispatcher;

/// Central real-time engine. One per process; cloned into request state.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Live connection table.
    pub registry: Arc<ConnectionRegistry>,
    /// Chat admission and relay.
    pub chat: Arc<ChatCoordinator>,
    /// Session administration.
    pub sessions: Arc<SessionLifecycle>,
    /// Notification dispatcher.
    pub notifications: Arc<NotificationDispatcher>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Cancelled once at shutdown.
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.registry.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        realtime: RealtimeConfig,
        chat: ChatConfig,
        store: Arc<dyn ChatStore>,
        verifier: Arc<dyn PrincipalVerifier>,
    ) -> AppResult<Self> {
        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new(
            realtime.send_timeout(),
            Arc::clone(&metrics),
        ));
        let notifications = Arc::new(NotificationDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&metrics),
            realtime.channel_buffer_size,
        ));
        let sessions = Arc::new(SessionLifecycle::new(
            Arc::clone(&store),
            Arc::clone(&notifications),
            chat,
        )?);
        let coordinator = Arc::new(ChatCoordinator::new(
            store,
            verifier,
            Arc::clone(&registry),
            Arc::clone(&metrics),
            realtime,
        ));

        info!(
            assignee_role = %sessions.assignee_role(),
            "Real-time engine initialized"
        );

        Ok(Self {
            registry,
            chat: coordinator,
            sessions,
            notifications,
            metrics,
            shutdown: CancellationToken::new(),
        })
    }

    /// Token cancelled when the engine shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Whether shutdown has begun.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stop accepting work and close every live connection.
    pub fn shutdown(&self) {
        info!(
            connections = self.registry.connection_count(),
            "Shutting down real-time engine"
        );
        self.shutdown.cancel();
        self.registry.close_all();
        info!("Real-time engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use dealerchat_auth::JwtDecoder;
    use dealerchat_core::config::AuthConfig;
    use dealerchat_core::types::FormInstanceId;
    use dealerchat_database::MemoryChatStore;
    use dealerchat_entity::employee::EmployeeRole;

    use super::*;
    use crate::chat::Participant;

    #[tokio::test]
    async fn test_shutdown_closes_live_connections() {
        let store = MemoryChatStore::new();
        store
            .add_activated_employee("E", EmployeeRole::SalesExecutive)
            .await;
        let engine = RealtimeEngine::new(
            RealtimeConfig::default(),
            ChatConfig::default(),
            Arc::new(store),
            Arc::new(JwtDecoder::new(&AuthConfig::default())),
        )
        .unwrap();

        let session = engine
            .sessions
            .open_session(FormInstanceId::new(), None)
            .await
            .unwrap()
            .into_session();
        let (conn, _rx) = engine
            .chat
            .join(Participant::customer(session.id))
            .await
            .unwrap();
        assert_eq!(engine.registry.connection_count(), 1);

        engine.shutdown();
        assert!(engine.is_shutting_down());
        assert_eq!(engine.registry.connection_count(), 0);
        assert!(conn.handle.cancellation_token().is_cancelled());
    }
}
