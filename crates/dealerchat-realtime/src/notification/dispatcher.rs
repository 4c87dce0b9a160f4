//! Notification dispatcher: pushes events to a user's live connections.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use dealerchat_auth::Principal;
use dealerchat_core::types::EmployeeId;
use dealerchat_entity::notification::NotificationEvent;

use crate::connection::{ConnectionHandle, ConnectionRegistry, FanOutReport};
use crate::message::builder;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

/// How one dispatch went. Failures are counted, never raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Connections that received the event.
    pub delivered: usize,
    /// Connections that failed and were dropped.
    pub failed: usize,
}

impl From<FanOutReport> for DispatchReport {
    fn from(report: FanOutReport) -> Self {
        Self {
            delivered: report.delivered,
            failed: report.failed,
        }
    }
}

impl std::ops::AddAssign for DispatchReport {
    fn add_assign(&mut self, other: Self) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// A registered notification connection.
#[derive(Debug, Clone)]
pub struct NotificationConnection {
    /// The employee the connection belongs to.
    pub user_id: EmployeeId,
    /// Outbound side of the connection.
    pub handle: Arc<ConnectionHandle>,
}

/// Routes notification events to the live connections of their target user.
///
/// Nothing is persisted here: an event for a user with no live connection
/// is dropped.
#[derive(Debug)]
pub struct NotificationDispatcher {
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
    /// Outbound queue size for new connections
    buffer: usize,
}

impl NotificationDispatcher {
    /// Create a new dispatcher
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        metrics: Arc<RealtimeMetrics>,
        buffer: usize,
    ) -> Self {
        Self {
            registry,
            metrics,
            buffer,
        }
    }

    /// Register a notification connection for a verified employee.
    ///
    /// Returns the connection and the receiver its transport drains.
    pub fn connect(
        &self,
        principal: &Principal,
    ) -> (NotificationConnection, mpsc::Receiver<OutboundMessage>) {
        let (handle, receiver) = ConnectionHandle::new(self.buffer);
        self.registry
            .register_user(principal.employee_id, Arc::clone(&handle));
        self.metrics.inc_connections_opened();
        info!(
            user_id = %principal.employee_id,
            conn_id = %handle.id,
            "Notification connection opened"
        );

        (
            NotificationConnection {
                user_id: principal.employee_id,
                handle,
            },
            receiver,
        )
    }

    /// Remove a notification connection.
    pub fn disconnect(&self, connection: &NotificationConnection) {
        self.registry
            .unregister_user(connection.user_id, connection.handle.id);
        connection.handle.close();
        self.metrics.inc_connections_closed();
        info!(
            user_id = %connection.user_id,
            conn_id = %connection.handle.id,
            "Notification connection closed"
        );
    }

    /// Push an event to every live connection of `user_id`.
    pub async fn dispatch(&self, user_id: EmployeeId, event: &NotificationEvent) -> DispatchReport {
        let frame = builder::notification(user_id, event);
        let report = DispatchReport::from(self.registry.fan_out_to_user(user_id, &frame).await);
        self.metrics.record_notification(report.delivered, report.failed);

        if report.delivered == 0 && report.failed == 0 {
            debug!(%user_id, event_type = %event.event_type, "No live connections, notification dropped");
        } else {
            debug!(
                %user_id,
                event_type = %event.event_type,
                delivered = report.delivered,
                failed = report.failed,
                "Notification dispatched"
            );
        }
        report
    }

    /// Push an event to its own `user_id`.
    pub async fn dispatch_event(&self, event: &NotificationEvent) -> DispatchReport {
        self.dispatch(event.user_id, event).await
    }

    /// Push the same event to several users.
    pub async fn dispatch_many(
        &self,
        user_ids: &[EmployeeId],
        event: &NotificationEvent,
    ) -> DispatchReport {
        let mut total = DispatchReport::default();
        for user_id in user_ids {
            total += self.dispatch(*user_id, event).await;
        }
        total
    }
}
