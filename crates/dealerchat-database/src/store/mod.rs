//! The durable session store seam.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use dealerchat_core::result::AppResult;
use dealerchat_core::types::{ChatSessionId, FormInstanceId};
use dealerchat_entity::chat::{ChatMessage, ChatSession, NewChatMessage, NewChatSession};
use dealerchat_entity::employee::{Employee, EmployeeRole};

/// Outcome of an attempt to open a session for a form instance.
#[derive(Debug, Clone)]
pub enum SessionCreation {
    /// A new session was stored.
    Created(ChatSession),
    /// An active session already existed and was left untouched.
    Existing(ChatSession),
}

impl SessionCreation {
    /// The session, regardless of whether it was just created.
    pub fn into_session(self) -> ChatSession {
        match self {
            Self::Created(s) | Self::Existing(s) => s,
        }
    }

    /// Whether the session was created by this call.
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Durable record of sessions, messages, and the employee directory view.
///
/// Implementations must keep at most one `ACTIVE` session per form instance
/// and return messages in `created_at` order, ties in insertion order.
#[async_trait]
pub trait ChatStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a session by ID.
    async fn find_session(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>>;

    /// Find the active session for a form instance.
    async fn find_active_session_for_form(
        &self,
        form_instance_id: FormInstanceId,
    ) -> AppResult<Option<ChatSession>>;

    /// All sessions, newest first.
    async fn list_sessions(&self) -> AppResult<Vec<ChatSession>>;

    /// Store a new active session unless one already exists for the form.
    async fn create_active_session(&self, data: NewChatSession) -> AppResult<SessionCreation>;

    /// Mark an active session `CLOSED`. `None` if missing or already closed.
    async fn close_session(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>>;

    /// Append a message and return the stored row.
    async fn append_message(&self, data: NewChatMessage) -> AppResult<ChatMessage>;

    /// All messages of a session, oldest first.
    async fn list_messages(&self, session_id: ChatSessionId) -> AppResult<Vec<ChatMessage>>;

    /// The activated employee of `role` with the fewest active sessions.
    async fn find_available_employee(&self, role: EmployeeRole) -> AppResult<Option<Employee>>;
}
