//! Chat message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dealerchat_core::types::{ChatMessageId, ChatSessionId, EmployeeId};

use super::role::ParticipantRole;

/// A persisted chat message. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: ChatMessageId,
    /// The session this message belongs to.
    pub session_id: ChatSessionId,
    /// Which side sent the message.
    pub sender_type: ParticipantRole,
    /// The sending employee; `None` for customer messages.
    pub sender_id: Option<EmployeeId>,
    /// Message text.
    pub content: String,
    /// When the message was stored.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Reconstruct the sender from the stored role/identity pair.
    ///
    /// Returns `None` if the row violates the role/identity invariant.
    pub fn sender(&self) -> Option<MessageSender> {
        match (self.sender_type, self.sender_id) {
            (ParticipantRole::Employee, Some(id)) => Some(MessageSender::Employee(id)),
            (ParticipantRole::Customer, None) => Some(MessageSender::Customer),
            _ => None,
        }
    }
}

/// Who sent a message.
///
/// An employee always carries an identity; a customer never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSender {
    /// The assigned employee.
    Employee(EmployeeId),
    /// The customer.
    Customer,
}

impl MessageSender {
    /// The participant role of this sender.
    pub fn role(&self) -> ParticipantRole {
        match self {
            Self::Employee(_) => ParticipantRole::Employee,
            Self::Customer => ParticipantRole::Customer,
        }
    }

    /// The employee identity, if any.
    pub fn employee_id(&self) -> Option<EmployeeId> {
        match self {
            Self::Employee(id) => Some(*id),
            Self::Customer => None,
        }
    }
}

/// Data required to store a new message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatMessage {
    /// The session to append to.
    pub session_id: ChatSessionId,
    /// Who sent it.
    pub sender: MessageSender,
    /// Message text.
    pub content: String,
}

impl NewChatMessage {
    /// Create a new message for a session.
    pub fn new(session_id: ChatSessionId, sender: MessageSender, content: impl Into<String>) -> Self {
        Self {
            session_id,
            sender,
            content: content.into(),
        }
    }
}
