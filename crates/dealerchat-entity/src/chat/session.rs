//! Chat session entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dealerchat_core::types::{ChatSessionId, EmployeeId, FormInstanceId};

/// Lifecycle state of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "chat_session_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    /// Open for new connections.
    Active,
    /// Closed by the assigned employee. Terminal.
    Closed,
}

impl SessionStatus {
    /// Return the status as its uppercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chat conversation anchored to one form instance.
///
/// At most one session per form instance is `ACTIVE` at a time. Sessions
/// are never deleted; closed sessions are kept as history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    /// Unique session identifier.
    pub id: ChatSessionId,
    /// The form instance this conversation belongs to.
    pub form_instance_id: FormInstanceId,
    /// Display name of the customer.
    pub customer_name: String,
    /// The employee handling the conversation.
    pub employee_id: EmployeeId,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
    /// When the session was closed. Set only on the `CLOSED` transition.
    pub closed_at: Option<DateTime<Utc>>,
}

impl ChatSession {
    /// Whether the session still accepts new connections.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Whether the given employee is the assignee of this session.
    pub fn is_assigned_to(&self, employee_id: EmployeeId) -> bool {
        self.employee_id == employee_id
    }
}

/// Data required to open a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatSession {
    /// The form instance this conversation belongs to.
    pub form_instance_id: FormInstanceId,
    /// Display name of the customer.
    pub customer_name: String,
    /// The employee who will handle the conversation.
    pub employee_id: EmployeeId,
}
