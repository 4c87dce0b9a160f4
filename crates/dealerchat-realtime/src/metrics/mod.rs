//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connections accepted (chat and notification)
    pub connections_opened: AtomicU64,
    /// Connections torn down
    pub connections_closed: AtomicU64,
    /// Connections refused at authorization
    pub connections_rejected: AtomicU64,
    /// Inbound chat frames received
    pub messages_received: AtomicU64,
    /// Inbound frames rejected by validation
    pub messages_rejected: AtomicU64,
    /// Chat messages written to the store
    pub messages_persisted: AtomicU64,
    /// Frames queued to connections during fan-out
    pub messages_sent: AtomicU64,
    /// Sends that failed or timed out
    pub send_failures: AtomicU64,
    /// Notification deliveries that reached a connection
    pub notifications_delivered: AtomicU64,
    /// Notification deliveries that failed
    pub notifications_failed: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_connections_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_connections_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_connections_rejected(&self) {
        self.connections_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_messages_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_messages_rejected(&self) {
        self.messages_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_messages_persisted(&self) {
        self.messages_persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_messages_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one notification dispatch.
    pub fn record_notification(&self, delivered: usize, failed: usize) {
        self.notifications_delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.notifications_failed
            .fetch_add(failed as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let opened = self.connections_opened.load(Ordering::Relaxed);
        let closed = self.connections_closed.load(Ordering::Relaxed);
        MetricsSnapshot {
            connections_opened: opened,
            connections_closed: closed,
            connections_active: opened.saturating_sub(closed),
            connections_rejected: self.connections_rejected.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_rejected: self.messages_rejected.load(Ordering::Relaxed),
            messages_persisted: self.messages_persisted.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            notifications_delivered: self.notifications_delivered.load(Ordering::Relaxed),
            notifications_failed: self.notifications_failed.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub connections_opened: u64,
    pub connections_closed: u64,
    /// Opened minus closed
    pub connections_active: u64,
    pub connections_rejected: u64,
    pub messages_received: u64,
    pub messages_rejected: u64,
    pub messages_persisted: u64,
    pub messages_sent: u64,
    pub send_failures: u64,
    pub notifications_delivered: u64,
    pub notifications_failed: u64,
}
