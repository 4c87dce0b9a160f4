//! Transient push notification event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use dealerchat_core::types::EmployeeId;

/// A push event addressed to one user's live connections.
///
/// Events are not persisted by the realtime core; a durable inbox is a
/// separate concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Event type tag, e.g. `form_submitted`.
    pub event_type: String,
    /// Target user.
    pub user_id: EmployeeId,
    /// Arbitrary event data.
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Create an event with an empty payload.
    pub fn new(event_type: impl Into<String>, user_id: EmployeeId) -> Self {
        Self {
            event_type: event_type.into(),
            user_id,
            payload: Map::new(),
            created_at: Utc::now(),
        }
    }

    /// Add a payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Replace the whole payload.
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }
}
