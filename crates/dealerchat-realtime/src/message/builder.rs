//! Builder helpers for constructing outbound messages.

use chrono::Utc;

use dealerchat_core::types::{ChatSessionId, EmployeeId};
use dealerchat_entity::chat::{ChatMessage, ParticipantRole};
use dealerchat_entity::notification::NotificationEvent;

use super::types::{MessageView, OutboundMessage};

/// Build the `connection_established` frame.
pub fn connection_established(role: ParticipantRole, session_id: ChatSessionId) -> OutboundMessage {
    OutboundMessage::ConnectionEstablished {
        role,
        session_id,
        timestamp: Utc::now(),
    }
}

/// Build the `history` frame from messages already in replay order.
///
/// Rows whose sender role and identity disagree are left out.
pub fn history(messages: &[ChatMessage]) -> OutboundMessage {
    OutboundMessage::History {
        messages: messages
            .iter()
            .filter(|msg| msg.sender().is_some())
            .map(MessageView::from)
            .collect(),
    }
}

/// Build a `message` frame.
pub fn chat_message(message: &ChatMessage) -> OutboundMessage {
    OutboundMessage::Message {
        data: MessageView::from(message),
    }
}

/// Build an `error` frame.
pub fn error(message: impl Into<String>) -> OutboundMessage {
    OutboundMessage::Error {
        message: message.into(),
    }
}

/// Build a `notification` frame addressed to `user_id`.
pub fn notification(user_id: EmployeeId, event: &NotificationEvent) -> OutboundMessage {
    OutboundMessage::Notification {
        event_type: event.event_type.clone(),
        user_id,
        payload: event.payload.clone(),
        timestamp: event.created_at,
    }
}
