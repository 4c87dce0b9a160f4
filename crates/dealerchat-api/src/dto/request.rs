//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use dealerchat_core::types::{EmployeeId, FormInstanceId};

/// Open (or fetch) the chat session of a form instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    /// The form instance the conversation belongs to.
    pub form_instance_id: FormInstanceId,
    /// Customer display name. Blank falls back to the configured default.
    #[serde(default)]
    #[validate(length(max = 1024, message = "Customer name is too long"))]
    pub customer_name: Option<String>,
}

/// Push a notification event to one employee's live connections.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchNotificationRequest {
    /// Target employee.
    pub user_id: EmployeeId,
    /// Event type tag, e.g. `form_submitted`.
    #[validate(length(min = 1, max = 64, message = "Event type must be 1-64 characters"))]
    pub event_type: String,
    /// Arbitrary event data.
    #[serde(default)]
    pub payload: Map<String, Value>,
}
