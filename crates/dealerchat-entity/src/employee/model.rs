//! Employee entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dealerchat_core::types::EmployeeId;

use super::role::EmployeeRole;

/// A staff member who can be assigned chat sessions.
///
/// Employee records are owned by the staff directory; the chat core only
/// reads them to pick an assignee.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: EmployeeId,
    /// Display name.
    pub name: String,
    /// Staff role.
    pub role: EmployeeRole,
    /// Whether the account has been activated.
    pub is_activated: bool,
    /// When the employee record was created.
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Whether this employee can take new chat sessions for the given role.
    pub fn is_available_as(&self, role: EmployeeRole) -> bool {
        self.is_activated && self.role == role
    }
}
