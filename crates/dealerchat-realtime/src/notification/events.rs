//! Common notification events.

use dealerchat_entity::chat::ChatSession;
use dealerchat_entity::notification::NotificationEvent;

/// A new chat session was assigned to the employee.
pub fn chat_session_assigned(session: &ChatSession) -> NotificationEvent {
    NotificationEvent::new("chat_session_assigned", session.employee_id)
        .with("session_id", session.id.to_string())
        .with("form_instance_id", session.form_instance_id.to_string())
        .with("customer_name", session.customer_name.as_str())
}
