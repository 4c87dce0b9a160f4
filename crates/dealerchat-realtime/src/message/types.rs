//! Inbound and outbound WebSocket message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use dealerchat_core::types::{ChatMessageId, ChatSessionId, EmployeeId};
use dealerchat_entity::chat::{ChatMessage, ParticipantRole};

/// A chat message as the client sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: ChatMessageId,
    pub content: String,
    pub sender_type: ParticipantRole,
    /// `null` for customer messages.
    pub sender_id: Option<EmployeeId>,
    pub created_at: DateTime<Utc>,
}

impl From<&ChatMessage> for MessageView {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            id: msg.id,
            content: msg.content.clone(),
            sender_type: msg.sender_type,
            sender_id: msg.sender_id,
            created_at: msg.created_at,
        }
    }
}

/// A chat frame sent by the client. Only `content` is read; any other
/// field, including a claimed sender, is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundChatMessage {
    /// Message text, non-empty after trimming.
    pub content: String,
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Sent once, before any other frame on the connection.
    ConnectionEstablished {
        /// The role the connection was admitted as.
        role: ParticipantRole,
        /// Session the connection belongs to.
        session_id: ChatSessionId,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Full session history, oldest first. Sent once after
    /// `connection_established`, even when empty.
    History {
        /// Stored messages.
        messages: Vec<MessageView>,
    },
    /// One chat message: the sender's acknowledgment or the relayed copy.
    Message {
        /// The stored message.
        data: MessageView,
    },
    /// A rejected inbound frame. The connection stays open.
    Error {
        /// Human-readable reason.
        message: String,
    },
    /// Push notification for an employee.
    Notification {
        /// Event type tag.
        event_type: String,
        /// Addressed user.
        user_id: EmployeeId,
        /// Event data.
        payload: Map<String, Value>,
        /// When the event was created.
        timestamp: DateTime<Utc>,
    },
}

impl OutboundMessage {
    /// The `type` tag of this frame.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished { .. } => "connection_established",
            Self::History { .. } => "history",
            Self::Message { .. } => "message",
            Self::Error { .. } => "error",
            Self::Notification { .. } => "notification",
        }
    }
}
