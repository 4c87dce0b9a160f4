//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dealerchat_core::types::{ChatSessionId, EmployeeId, FormInstanceId};
use dealerchat_entity::chat::{ChatSession, SessionStatus};
use dealerchat_realtime::{DispatchReport, MetricsSnapshot};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Chat session summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSessionResponse {
    /// Session ID.
    pub id: ChatSessionId,
    /// Form instance the session belongs to.
    pub form_instance_id: FormInstanceId,
    /// Customer display name.
    pub customer_name: String,
    /// Assigned employee.
    pub employee_id: EmployeeId,
    /// `ACTIVE` or `CLOSED`.
    pub status: SessionStatus,
    /// Opened at.
    pub created_at: DateTime<Utc>,
    /// Closed at, once closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<ChatSession> for ChatSessionResponse {
    fn from(s: ChatSession) -> Self {
        Self {
            id: s.id,
            form_instance_id: s.form_instance_id,
            customer_name: s.customer_name,
            employee_id: s.employee_id,
            status: s.status,
            created_at: s.created_at,
            closed_at: s.closed_at,
        }
    }
}

/// Result of closing a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseSessionResponse {
    /// Confirmation text.
    pub message: String,
    /// The closed session.
    pub session: ChatSessionResponse,
}

/// Result of a notification dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    /// Event type that was pushed.
    pub event_type: String,
    /// Target employee.
    pub user_id: EmployeeId,
    /// Per-connection outcome.
    #[serde(flatten)]
    pub report: DispatchReport,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: i64,
    /// `connected`, `unreachable`, or `in-memory`.
    pub database: String,
    /// Live WebSocket connections.
    pub ws_connections: usize,
    /// Realtime counters.
    pub metrics: MetricsSnapshot,
}
