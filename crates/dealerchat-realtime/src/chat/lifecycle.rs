//! Administrative session lifecycle: open, look up, close.

use std::sync::Arc;

use tracing::info;

use dealerchat_auth::Principal;
use dealerchat_core::config::ChatConfig;
use dealerchat_core::error::AppError;
use dealerchat_core::result::AppResult;
use dealerchat_core::types::{ChatSessionId, FormInstanceId};
use dealerchat_database::{ChatStore, SessionCreation};
use dealerchat_entity::chat::{ChatSession, NewChatSession};
use dealerchat_entity::employee::EmployeeRole;

use crate::notification::NotificationDispatcher;
use crate::notification::events;

/// Opens, lists, and closes chat sessions.
#[derive(Debug)]
pub struct SessionLifecycle {
    store: Arc<dyn ChatStore>,
    notifications: Arc<NotificationDispatcher>,
    config: ChatConfig,
    /// Role whose employees take new sessions
    assignee_role: EmployeeRole,
}

impl SessionLifecycle {
    /// Create the lifecycle service. Fails if `chat.assignee_role` is not a
    /// known employee role.
    pub fn new(
        store: Arc<dyn ChatStore>,
        notifications: Arc<NotificationDispatcher>,
        config: ChatConfig,
    ) -> AppResult<Self> {
        let assignee_role = config.assignee_role.parse::<EmployeeRole>().map_err(|e| {
            AppError::configuration(format!("Invalid chat.assignee_role: {}", e.message))
        })?;

        Ok(Self {
            store,
            notifications,
            config,
            assignee_role,
        })
    }

    /// The role new sessions are assigned to.
    pub fn assignee_role(&self) -> EmployeeRole {
        self.assignee_role
    }

    /// Return the active session for a form instance, creating one if none
    /// exists.
    ///
    /// A new session goes to the activated employee of the assignee role
    /// with the fewest active sessions, who is then notified.
    pub async fn open_session(
        &self,
        form_instance_id: FormInstanceId,
        customer_name: Option<&str>,
    ) -> AppResult<SessionCreation> {
        let customer_name = self.resolve_customer_name(customer_name)?;

        if let Some(existing) = self
            .store
            .find_active_session_for_form(form_instance_id)
            .await?
        {
            return Ok(SessionCreation::Existing(existing));
        }

        let employee = self
            .store
            .find_available_employee(self.assignee_role)
            .await?
            .ok_or_else(|| {
                AppError::service_unavailable(format!(
                    "No available {} to handle chat",
                    self.assignee_role
                ))
            })?;

        let creation = self
            .store
            .create_active_session(NewChatSession {
                form_instance_id,
                customer_name,
                employee_id: employee.id,
            })
            .await?;

        if let SessionCreation::Created(session) = &creation {
            info!(
                session_id = %session.id,
                %form_instance_id,
                employee_id = %session.employee_id,
                "Chat session opened"
            );
            self.notifications
                .dispatch_event(&events::chat_session_assigned(session))
                .await;
        }

        Ok(creation)
    }

    /// All sessions, newest first.
    pub async fn list_sessions(&self) -> AppResult<Vec<ChatSession>> {
        self.store.list_sessions().await
    }

    /// One session by ID.
    pub async fn get_session(&self, session_id: ChatSessionId) -> AppResult<ChatSession> {
        self.store
            .find_session(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Chat session {session_id} not found")))
    }

    /// The active session of a form instance.
    pub async fn active_session_for_form(
        &self,
        form_instance_id: FormInstanceId,
    ) -> AppResult<ChatSession> {
        self.store
            .find_active_session_for_form(form_instance_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No active chat session for form instance {form_instance_id}"
                ))
            })
    }

    /// Close a session on behalf of its assigned employee.
    ///
    /// Closing is irreversible. Live connections stay registered; only new
    /// connections are refused.
    pub async fn close_session(
        &self,
        session_id: ChatSessionId,
        principal: &Principal,
    ) -> AppResult<ChatSession> {
        let session = self.get_session(session_id).await?;

        if !session.is_assigned_to(principal.employee_id) {
            return Err(AppError::authorization(
                "Only the assigned employee can close this chat session",
            ));
        }
        if !session.is_active() {
            return Err(AppError::conflict(format!(
                "Chat session {session_id} is already closed"
            )));
        }

        let closed = self.store.close_session(session_id).await?.ok_or_else(|| {
            AppError::conflict(format!("Chat session {session_id} is already closed"))
        })?;

        info!(%session_id, employee_id = %principal.employee_id, "Chat session closed");
        Ok(closed)
    }

    fn resolve_customer_name(&self, name: Option<&str>) -> AppResult<String> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        match name {
            None => Ok(self.config.default_customer_name.clone()),
            Some(n) if n.chars().count() > self.config.max_customer_name_length => {
                Err(AppError::validation(format!(
                    "Customer name must be at most {} characters",
                    self.config.max_customer_name_length
                )))
            }
            Some(n) => Ok(n.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dealerchat_core::ErrorKind;
    use dealerchat_core::types::EmployeeId;
    use dealerchat_database::MemoryChatStore;
    use dealerchat_entity::chat::SessionStatus;

    use super::*;
    use crate::connection::ConnectionRegistry;
    use crate::message::types::OutboundMessage;
    use crate::metrics::RealtimeMetrics;

    fn lifecycle(store: &MemoryChatStore) -> (SessionLifecycle, Arc<NotificationDispatcher>) {
        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new(
            Duration::from_millis(50),
            Arc::clone(&metrics),
        ));
        let notifications = Arc::new(NotificationDispatcher::new(registry, metrics, 8));
        let lifecycle = SessionLifecycle::new(
            Arc::new(store.clone()),
            Arc::clone(&notifications),
            ChatConfig::default(),
        )
        .unwrap();
        (lifecycle, notifications)
    }

    fn principal_of(session: &ChatSession) -> Principal {
        Principal {
            employee_id: session.employee_id,
            role: EmployeeRole::SalesExecutive,
            name: "Asha".to_string(),
        }
    }

    #[tokio::test]
    async fn test_open_close_reopen_yields_new_session() {
        let store = MemoryChatStore::new();
        let employee = store
            .add_activated_employee("E7", EmployeeRole::SalesExecutive)
            .await;
        let (lifecycle, _) = lifecycle(&store);
        let form = FormInstanceId::new();

        let s1 = lifecycle.open_session(form, None).await.unwrap();
        assert!(s1.is_created());
        let s1 = s1.into_session();
        assert_eq!(s1.status, SessionStatus::Active);
        assert_eq!(s1.employee_id, employee.id);

        let again = lifecycle.open_session(form, Some("Someone Else")).await.unwrap();
        assert!(!again.is_created());
        assert_eq!(again.into_session().id, s1.id);

        let closed = lifecycle
            .close_session(s1.id, &principal_of(&s1))
            .await
            .unwrap();
        assert_eq!(closed.status, SessionStatus::Closed);

        let s2 = lifecycle.open_session(form, None).await.unwrap().into_session();
        assert_ne!(s2.id, s1.id);
        assert_eq!(lifecycle.active_session_for_form(form).await.unwrap().id, s2.id);
        assert_eq!(lifecycle.list_sessions().await.unwrap()[0].id, s2.id);
    }

    #[tokio::test]
    async fn test_no_available_employee() {
        let store = MemoryChatStore::new();
        store.add_activated_employee("F", EmployeeRole::Finance).await;
        let (lifecycle, _) = lifecycle(&store);

        let err = lifecycle
            .open_session(FormInstanceId::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_customer_name_defaults_and_limits() {
        let store = MemoryChatStore::new();
        store
            .add_activated_employee("E", EmployeeRole::SalesExecutive)
            .await;
        let (lifecycle, _) = lifecycle(&store);

        let session = lifecycle
            .open_session(FormInstanceId::new(), Some("   "))
            .await
            .unwrap()
            .into_session();
        assert_eq!(session.customer_name, "Anonymous Customer");

        let long = "x".repeat(500);
        let err = lifecycle
            .open_session(FormInstanceId::new(), Some(&long))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_new_sessions_spread_across_employees() {
        let store = MemoryChatStore::new();
        let a = store
            .add_activated_employee("A", EmployeeRole::SalesExecutive)
            .await;
        let b = store
            .add_activated_employee("B", EmployeeRole::SalesExecutive)
            .await;
        let (lifecycle, _) = lifecycle(&store);

        let first = lifecycle
            .open_session(FormInstanceId::new(), None)
            .await
            .unwrap()
            .into_session();
        let second = lifecycle
            .open_session(FormInstanceId::new(), None)
            .await
            .unwrap()
            .into_session();

        let mut assignees = [first.employee_id, second.employee_id];
        assignees.sort_by_key(|id| id.to_string());
        let mut expected = [a.id, b.id];
        expected.sort_by_key(|id| id.to_string());
        assert_eq!(assignees, expected);
    }

    #[tokio::test]
    async fn test_close_requires_assignee_and_is_terminal() {
        let store = MemoryChatStore::new();
        store
            .add_activated_employee("E", EmployeeRole::SalesExecutive)
            .await;
        let (lifecycle, _) = lifecycle(&store);
        let session = lifecycle
            .open_session(FormInstanceId::new(), None)
            .await
            .unwrap()
            .into_session();

        let stranger = Principal {
            employee_id: EmployeeId::new(),
            role: EmployeeRole::Dealer,
            name: "D".to_string(),
        };
        let err = lifecycle.close_session(session.id, &stranger).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        lifecycle
            .close_session(session.id, &principal_of(&session))
            .await
            .unwrap();
        let err = lifecycle
            .close_session(session.id, &principal_of(&session))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let err = lifecycle
            .close_session(ChatSessionId::new(), &principal_of(&session))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_assignee_is_notified_of_new_session() {
        let store = MemoryChatStore::new();
        let employee = store
            .add_activated_employee("E", EmployeeRole::SalesExecutive)
            .await;
        let (lifecycle, notifications) = lifecycle(&store);
        let (_conn, mut rx) = notifications.connect(&Principal {
            employee_id: employee.id,
            role: EmployeeRole::SalesExecutive,
            name: "E".to_string(),
        });

        let session = lifecycle
            .open_session(FormInstanceId::new(), Some("Ravi"))
            .await
            .unwrap()
            .into_session();

        match rx.recv().await {
            Some(OutboundMessage::Notification {
                event_type, payload, ..
            }) => {
                assert_eq!(event_type, "chat_session_assigned");
                assert_eq!(
                    payload.get("session_id"),
                    Some(&serde_json::Value::from(session.id.to_string()))
                );
            }
            other => panic!("expected notification, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_assignee_role() {
        let store = MemoryChatStore::new();
        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new(
            Duration::from_millis(50),
            Arc::clone(&metrics),
        ));
        let config = ChatConfig {
            assignee_role: "janitor".to_string(),
            ..ChatConfig::default()
        };
        let err = SessionLifecycle::new(
            Arc::new(store),
            Arc::new(NotificationDispatcher::new(registry, metrics, 8)),
            config,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
