//! Connection registry of live chat connections keyed by (session, role) and
//! live notification connections keyed by user.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dealerchat_core::types::{ChatSessionId, EmployeeId};
use dealerchat_entity::chat::ParticipantRole;

use super::handle::{ConnectionHandle, ConnectionId};
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

type ConnectionSet = HashMap<ConnectionId, Arc<ConnectionHandle>>;
type RoleTable = HashMap<ParticipantRole, ConnectionSet>;

/// Outcome of delivering one payload to a set of connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOutReport {
    /// Connections that accepted the payload.
    pub delivered: usize,
    /// Connections that failed and were unregistered.
    pub failed: usize,
}

/// Thread-safe table of live connections.
///
/// Mutations on one key are serialized by the map shard. Fan-out copies
/// the target handles out of the shard, releases it, and only then sends,
/// so a slow connection never holds a lock.
#[derive(Debug)]
pub struct ConnectionRegistry {
    /// Session ID → role → connections.
    sessions: DashMap<ChatSessionId, RoleTable>,
    /// User ID → notification connections.
    users: DashMap<EmployeeId, ConnectionSet>,
    /// Per-connection send deadline during fan-out.
    send_timeout: Duration,
    metrics: Arc<RealtimeMetrics>,
}

impl ConnectionRegistry {
    /// Creates a new empty registry.
    pub fn new(send_timeout: Duration, metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            sessions: DashMap::new(),
            users: DashMap::new(),
            send_timeout,
            metrics,
        }
    }

    /// The per-connection send deadline.
    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Add a chat connection. Registering the same handle twice is a no-op.
    pub fn register(
        &self,
        session_id: ChatSessionId,
        role: ParticipantRole,
        handle: Arc<ConnectionHandle>,
    ) {
        debug!(%session_id, %role, conn_id = %handle.id, "Registering chat connection");
        self.sessions
            .entry(session_id)
            .or_default()
            .entry(role)
            .or_default()
            .insert(handle.id, handle);
    }

    /// Remove a chat connection, dropping emptied role and session entries.
    ///
    /// Returns whether the connection was registered.
    pub fn unregister(
        &self,
        session_id: ChatSessionId,
        role: ParticipantRole,
        connection_id: ConnectionId,
    ) -> bool {
        let removed = {
            let Some(mut roles) = self.sessions.get_mut(&session_id) else {
                return false;
            };
            let removed = roles
                .get_mut(&role)
                .is_some_and(|set| set.remove(&connection_id).is_some());
            if roles.get(&role).is_some_and(|set| set.is_empty()) {
                roles.remove(&role);
            }
            removed
        };
        self.sessions.remove_if(&session_id, |_, roles| roles.is_empty());

        if removed {
            debug!(%session_id, %role, conn_id = %connection_id, "Unregistered chat connection");
        }
        removed
    }

    /// Deliver `payload` to every connection of `session_id` whose role is
    /// not `exclude_role`.
    ///
    /// A connection that fails or misses the send deadline is unregistered
    /// and closed; delivery to the others continues.
    pub async fn fan_out(
        &self,
        session_id: ChatSessionId,
        payload: &OutboundMessage,
        exclude_role: Option<ParticipantRole>,
    ) -> FanOutReport {
        let targets = self.session_targets(session_id, exclude_role);
        if targets.is_empty() {
            return FanOutReport::default();
        }

        let (delivered, failed) = self.deliver(targets, payload).await;
        for (role, handle) in &failed {
            self.unregister(session_id, *role, handle.id);
            handle.close();
        }

        FanOutReport {
            delivered,
            failed: failed.len(),
        }
    }

    /// Add a notification connection for a user.
    pub fn register_user(&self, user_id: EmployeeId, handle: Arc<ConnectionHandle>) {
        debug!(%user_id, conn_id = %handle.id, "Registering notification connection");
        self.users
            .entry(user_id)
            .or_default()
            .insert(handle.id, handle);
    }

    /// Remove a notification connection, dropping the user entry when empty.
    pub fn unregister_user(&self, user_id: EmployeeId, connection_id: ConnectionId) -> bool {
        let removed = match self.users.get_mut(&user_id) {
            Some(mut set) => set.remove(&connection_id).is_some(),
            None => return false,
        };
        self.users.remove_if(&user_id, |_, set| set.is_empty());
        removed
    }

    /// Deliver `payload` to every notification connection of a user.
    pub async fn fan_out_to_user(
        &self,
        user_id: EmployeeId,
        payload: &OutboundMessage,
    ) -> FanOutReport {
        let targets: Vec<((), Arc<ConnectionHandle>)> = self
            .users
            .get(&user_id)
            .map(|set| set.values().map(|h| ((), Arc::clone(h))).collect())
            .unwrap_or_default();
        if targets.is_empty() {
            return FanOutReport::default();
        }

        let (delivered, failed) = self.deliver(targets, payload).await;
        for ((), handle) in &failed {
            self.unregister_user(user_id, handle.id);
            handle.close();
        }

        FanOutReport {
            delivered,
            failed: failed.len(),
        }
    }

    /// Live chat connections on a session, across roles.
    pub fn session_connection_count(&self, session_id: ChatSessionId) -> usize {
        self.sessions
            .get(&session_id)
            .map(|roles| roles.values().map(HashMap::len).sum())
            .unwrap_or(0)
    }

    /// Live chat connections on a session for one role.
    pub fn role_connection_count(&self, session_id: ChatSessionId, role: ParticipantRole) -> usize {
        self.sessions
            .get(&session_id)
            .and_then(|roles| roles.get(&role).map(HashMap::len))
            .unwrap_or(0)
    }

    /// Live notification connections of a user.
    pub fn user_connection_count(&self, user_id: EmployeeId) -> usize {
        self.users.get(&user_id).map(|set| set.len()).unwrap_or(0)
    }

    /// Whether the registry holds any entry for a session.
    pub fn has_session(&self, session_id: ChatSessionId) -> bool {
        self.sessions.contains_key(&session_id)
    }

    /// Total live connections, chat and notification.
    pub fn connection_count(&self) -> usize {
        let chat: usize = self
            .sessions
            .iter()
            .map(|entry| entry.value().values().map(HashMap::len).sum::<usize>())
            .sum();
        let notification: usize = self.users.iter().map(|entry| entry.value().len()).sum();
        chat + notification
    }

    /// Close and forget every connection.
    pub fn close_all(&self) {
        let mut handles: Vec<Arc<ConnectionHandle>> = Vec::new();
        for entry in self.sessions.iter() {
            for set in entry.value().values() {
                handles.extend(set.values().cloned());
            }
        }
        for entry in self.users.iter() {
            handles.extend(entry.value().values().cloned());
        }
        self.sessions.clear();
        self.users.clear();

        for handle in &handles {
            handle.close();
        }
        debug!(count = handles.len(), "Closed all connections");
    }

    /// Snapshot the targets of a session fan-out.
    fn session_targets(
        &self,
        session_id: ChatSessionId,
        exclude_role: Option<ParticipantRole>,
    ) -> Vec<(ParticipantRole, Arc<ConnectionHandle>)> {
        let Some(roles) = self.sessions.get(&session_id) else {
            return Vec::new();
        };
        roles
            .iter()
            .filter(|(role, _)| Some(**role) != exclude_role)
            .flat_map(|(role, set)| set.values().map(move |h| (*role, Arc::clone(h))))
            .collect()
    }

    /// Send concurrently to every target; returns the delivered count and
    /// the targets that failed.
    async fn deliver<K: Copy>(
        &self,
        targets: Vec<(K, Arc<ConnectionHandle>)>,
        payload: &OutboundMessage,
    ) -> (usize, Vec<(K, Arc<ConnectionHandle>)>) {
        let deadline = self.send_timeout;
        let sends = targets.into_iter().map(|(key, handle)| {
            let msg = payload.clone();
            async move {
                let result = handle.send(msg, deadline).await;
                (key, handle, result)
            }
        });

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (key, handle, result) in join_all(sends).await {
            match result {
                Ok(()) => {
                    delivered += 1;
                    self.metrics.inc_messages_sent();
                }
                Err(e) => {
                    warn!(conn_id = %handle.id, error = %e, "Dropping connection after failed send");
                    self.metrics.inc_send_failures();
                    failed.push((key, handle));
                }
            }
        }
        (delivered, failed)
    }
}
