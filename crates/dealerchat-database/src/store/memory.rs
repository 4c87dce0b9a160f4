//! In-process [`ChatStore`] for tests and single-node development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use dealerchat_core::error::AppError;
use dealerchat_core::result::AppResult;
use dealerchat_core::types::{ChatMessageId, ChatSessionId, EmployeeId, FormInstanceId};
use dealerchat_entity::chat::{
    ChatMessage, ChatSession, NewChatMessage, NewChatSession, SessionStatus,
};
use dealerchat_entity::employee::{Employee, EmployeeRole};

use super::{ChatStore, SessionCreation};

#[derive(Debug, Default)]
struct InnerState {
    employees: Vec<Employee>,
    sessions: HashMap<ChatSessionId, ChatSession>,
    /// Insertion order of sessions.
    session_order: Vec<ChatSessionId>,
    messages: HashMap<ChatSessionId, Vec<ChatMessage>>,
}

impl InnerState {
    fn active_for_form(&self, form_instance_id: FormInstanceId) -> Option<&ChatSession> {
        self.sessions
            .values()
            .find(|s| s.form_instance_id == form_instance_id && s.is_active())
    }

    fn active_load(&self, employee_id: EmployeeId) -> usize {
        self.sessions
            .values()
            .filter(|s| s.employee_id == employee_id && s.is_active())
            .count()
    }
}

/// Chat store held entirely in memory. State is lost on drop.
#[derive(Debug, Clone, Default)]
pub struct MemoryChatStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryChatStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an employee into the directory view.
    pub async fn add_employee(&self, employee: Employee) {
        self.state.lock().await.employees.push(employee);
    }

    /// Seed an activated employee with the given role and return it.
    pub async fn add_activated_employee(&self, name: &str, role: EmployeeRole) -> Employee {
        let employee = Employee {
            id: EmployeeId::new(),
            name: name.to_string(),
            role,
            is_activated: true,
            created_at: Utc::now(),
        };
        self.add_employee(employee.clone()).await;
        employee
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn find_session(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>> {
        Ok(self.state.lock().await.sessions.get(&id).cloned())
    }

    async fn find_active_session_for_form(
        &self,
        form_instance_id: FormInstanceId,
    ) -> AppResult<Option<ChatSession>> {
        Ok(self.state.lock().await.active_for_form(form_instance_id).cloned())
    }

    async fn list_sessions(&self) -> AppResult<Vec<ChatSession>> {
        let state = self.state.lock().await;
        Ok(state
            .session_order
            .iter()
            .rev()
            .filter_map(|id| state.sessions.get(id).cloned())
            .collect())
    }

    async fn create_active_session(&self, data: NewChatSession) -> AppResult<SessionCreation> {
        let mut state = self.state.lock().await;

        if let Some(existing) = state.active_for_form(data.form_instance_id) {
            return Ok(SessionCreation::Existing(existing.clone()));
        }

        let session = ChatSession {
            id: ChatSessionId::new(),
            form_instance_id: data.form_instance_id,
            customer_name: data.customer_name,
            employee_id: data.employee_id,
            status: SessionStatus::Active,
            created_at: Utc::now(),
            closed_at: None,
        };
        state.session_order.push(session.id);
        state.sessions.insert(session.id, session.clone());
        Ok(SessionCreation::Created(session))
    }

    async fn close_session(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>> {
        let mut state = self.state.lock().await;
        match state.sessions.get_mut(&id) {
            Some(session) if session.is_active() => {
                session.status = SessionStatus::Closed;
                session.closed_at = Some(Utc::now());
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn append_message(&self, data: NewChatMessage) -> AppResult<ChatMessage> {
        let mut state = self.state.lock().await;
        if !state.sessions.contains_key(&data.session_id) {
            return Err(AppError::not_found(format!(
                "Chat session {} not found",
                data.session_id
            )));
        }

        let message = ChatMessage {
            id: ChatMessageId::new(),
            session_id: data.session_id,
            sender_type: data.sender.role(),
            sender_id: data.sender.employee_id(),
            content: data.content,
            created_at: Utc::now(),
        };
        state
            .messages
            .entry(data.session_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, session_id: ChatSessionId) -> AppResult<Vec<ChatMessage>> {
        let state = self.state.lock().await;
        let mut messages = state.messages.get(&session_id).cloned().unwrap_or_default();
        // Stable sort keeps insertion order for equal timestamps.
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn find_available_employee(&self, role: EmployeeRole) -> AppResult<Option<Employee>> {
        let state = self.state.lock().await;
        Ok(state
            .employees
            .iter()
            .filter(|e| e.is_available_as(role))
            .min_by_key(|e| (state.active_load(e.id), e.created_at))
            .cloned())
    }
}
