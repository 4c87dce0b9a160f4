//! PostgreSQL-backed [`ChatStore`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use dealerchat_core::error::AppError;
use dealerchat_core::result::AppResult;
use dealerchat_core::types::{ChatSessionId, FormInstanceId};
use dealerchat_entity::chat::{ChatMessage, ChatSession, NewChatMessage, NewChatSession};
use dealerchat_entity::employee::{Employee, EmployeeRole};

use super::{ChatStore, SessionCreation};
use crate::repositories::{EmployeeRepository, MessageRepository, SessionRepository};

/// Chat store over the `chat_sessions`, `chat_messages` and `employees`
/// tables.
#[derive(Debug, Clone)]
pub struct PgChatStore {
    sessions: SessionRepository,
    messages: MessageRepository,
    employees: EmployeeRepository,
}

impl PgChatStore {
    /// Build the store from a connection pool.
    pub(crate) fn new(pool: PgPool) -> Self {
        Self {
            sessions: SessionRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            employees: EmployeeRepository::new(pool),
        }
    }

    /// Employee directory access.
    pub fn employees(&self) -> &EmployeeRepository {
        &self.employees
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn find_session(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>> {
        self.sessions.find_by_id(id).await
    }

    async fn find_active_session_for_form(
        &self,
        form_instance_id: FormInstanceId,
    ) -> AppResult<Option<ChatSession>> {
        self.sessions.find_active_by_form(form_instance_id).await
    }

    async fn list_sessions(&self) -> AppResult<Vec<ChatSession>> {
        self.sessions.find_all().await
    }

    async fn create_active_session(&self, data: NewChatSession) -> AppResult<SessionCreation> {
        if let Some(session) = self.sessions.insert_active(&data).await? {
            return Ok(SessionCreation::Created(session));
        }

        debug!(
            form_instance_id = %data.form_instance_id,
            "Active session already exists, returning it"
        );
        self.sessions
            .find_active_by_form(data.form_instance_id)
            .await?
            .map(SessionCreation::Existing)
            .ok_or_else(|| {
                AppError::conflict(format!(
                    "Active session for form {} changed while opening",
                    data.form_instance_id
                ))
            })
    }

    async fn close_session(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>> {
        self.sessions.close(id).await
    }

    async fn append_message(&self, data: NewChatMessage) -> AppResult<ChatMessage> {
        self.messages.insert(&data).await
    }

    async fn list_messages(&self, session_id: ChatSessionId) -> AppResult<Vec<ChatMessage>> {
        self.messages.find_by_session(session_id).await
    }

    async fn find_available_employee(&self, role: EmployeeRole) -> AppResult<Option<Employee>> {
        self.employees.find_least_loaded(role).await
    }
}
