//! Chat message repository implementation.

use chrono::Utc;
use sqlx::PgPool;

use dealerchat_core::error::{AppError, ErrorKind};
use dealerchat_core::result::AppResult;
use dealerchat_core::types::{ChatMessageId, ChatSessionId};
use dealerchat_entity::chat::{ChatMessage, NewChatMessage};

/// Repository for the append-only chat message log.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a message to a session.
    pub async fn insert(&self, data: &NewChatMessage) -> AppResult<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO chat_messages (id, session_id, sender_type, sender_id, content, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, session_id, sender_type, sender_id, content, created_at",
        )
        .bind(ChatMessageId::new())
        .bind(data.session_id)
        .bind(data.sender.role())
        .bind(data.sender.employee_id())
        .bind(&data.content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store chat message", e))
    }

    /// All messages of a session, oldest first. Ties keep insertion order.
    pub async fn find_by_session(&self, session_id: ChatSessionId) -> AppResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT id, session_id, sender_type, sender_id, content, created_at \
             FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC, seq ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load chat history", e)
        })
    }
}
