//! Authorized chat participant.

use serde::{Deserialize, Serialize};

use dealerchat_core::types::ChatSessionId;
use dealerchat_entity::chat::{MessageSender, ParticipantRole};

/// Who a chat connection speaks for, fixed at authorization time.
///
/// Everything persisted from the connection takes its sender from here,
/// never from the client's frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The session the connection was admitted to.
    pub session_id: ChatSessionId,
    /// Role and, for employees, identity.
    pub sender: MessageSender,
}

impl Participant {
    /// An admitted customer.
    pub fn customer(session_id: ChatSessionId) -> Self {
        Self {
            session_id,
            sender: MessageSender::Customer,
        }
    }

    /// The participant's role.
    pub fn role(&self) -> ParticipantRole {
        self.sender.role()
    }
}
