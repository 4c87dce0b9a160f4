//! Chat session repository implementation.

use chrono::Utc;
use sqlx::PgPool;

use dealerchat_core::error::{AppError, ErrorKind};
use dealerchat_core::result::AppResult;
use dealerchat_core::types::{ChatSessionId, FormInstanceId};
use dealerchat_entity::chat::{ChatSession, NewChatSession};

const SESSION_COLUMNS: &str =
    "id, form_instance_id, customer_name, employee_id, status, created_at, closed_at";

/// Repository for chat session queries and state transitions.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>> {
        sqlx::query_as::<_, ChatSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find chat session", e))
    }

    /// Find the active session for a form instance.
    pub async fn find_active_by_form(
        &self,
        form_instance_id: FormInstanceId,
    ) -> AppResult<Option<ChatSession>> {
        sqlx::query_as::<_, ChatSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM chat_sessions \
             WHERE form_instance_id = $1 AND status = 'ACTIVE'"
        ))
        .bind(form_instance_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find active chat session for form",
                e,
            )
        })
    }

    /// List all sessions, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<ChatSession>> {
        sqlx::query_as::<_, ChatSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM chat_sessions ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list chat sessions", e))
    }

    /// Insert a new active session.
    ///
    /// Returns `None` when another active session already exists for the
    /// form instance (the partial unique index rejected the row).
    pub async fn insert_active(&self, data: &NewChatSession) -> AppResult<Option<ChatSession>> {
        sqlx::query_as::<_, ChatSession>(&format!(
            "INSERT INTO chat_sessions (id, form_instance_id, customer_name, employee_id, status, created_at) \
             VALUES ($1, $2, $3, $4, 'ACTIVE', $5) \
             ON CONFLICT (form_instance_id) WHERE status = 'ACTIVE' DO NOTHING \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(ChatSessionId::new())
        .bind(data.form_instance_id)
        .bind(&data.customer_name)
        .bind(data.employee_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create chat session", e))
    }

    /// Transition an active session to `CLOSED`.
    ///
    /// Returns `None` if the session does not exist or is already closed.
    pub async fn close(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>> {
        sqlx::query_as::<_, ChatSession>(&format!(
            "UPDATE chat_sessions SET status = 'CLOSED', closed_at = $2 \
             WHERE id = $1 AND status = 'ACTIVE' \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to close chat session", e))
    }
}
