//! Inbound chat frame validation.

use serde_json::Value;

use dealerchat_core::error::AppError;

use super::types::InboundChatMessage;

/// Parse and validate a raw chat frame.
///
/// The returned content is kept verbatim; trimming is only used to reject
/// blank messages.
pub fn parse_chat_message(raw: &str, max_bytes: usize) -> Result<InboundChatMessage, AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    let value: Value =
        serde_json::from_str(raw).map_err(|_| AppError::validation("Invalid JSON format"))?;

    let Value::Object(mut fields) = value else {
        return Err(AppError::validation("Message must be a JSON object"));
    };

    let content = match fields.remove("content") {
        None => return Err(AppError::validation("Message must contain 'content' field")),
        Some(Value::String(content)) => content,
        Some(_) => return Err(AppError::validation("Message content must be a string")),
    };

    if content.trim().is_empty() {
        return Err(AppError::validation("Message content cannot be empty"));
    }

    Ok(InboundChatMessage { content })
}
