//! Chat coordinator. Admits chat connections and moves messages between
//! the two sides of a session.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use dealerchat_auth::PrincipalVerifier;
use dealerchat_core::config::RealtimeConfig;
use dealerchat_core::error::AppError;
use dealerchat_core::result::AppResult;
use dealerchat_core::types::ChatSessionId;
use dealerchat_database::ChatStore;
use dealerchat_entity::chat::{ChatMessage, MessageSender, NewChatMessage, ParticipantRole};

use super::participant::Participant;
use crate::connection::{ConnectionHandle, ConnectionRegistry, FanOutReport};
use crate::message::types::OutboundMessage;
use crate::message::{builder, validator};
use crate::metrics::RealtimeMetrics;

/// A registered chat connection.
#[derive(Debug, Clone)]
pub struct ChatConnection {
    /// Who the connection speaks for.
    pub participant: Participant,
    /// Outbound side of the connection.
    pub handle: Arc<ConnectionHandle>,
}

/// What happened to one inbound frame.
#[derive(Debug, Clone)]
pub enum InboundOutcome {
    /// The frame failed validation; an `error` frame went back to the sender.
    Rejected {
        /// The reason sent to the client.
        reason: String,
    },
    /// The message was stored, acknowledged, and relayed.
    Delivered {
        /// The stored message.
        message: ChatMessage,
        /// Whether the sender's acknowledgment was queued.
        acknowledged: bool,
        /// Delivery to the other side.
        relayed: FanOutReport,
    },
}

/// Admission and message flow for chat connections.
#[derive(Debug)]
pub struct ChatCoordinator {
    store: Arc<dyn ChatStore>,
    verifier: Arc<dyn PrincipalVerifier>,
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
    /// Serializes joins against message delivery on the same session.
    session_locks: DashMap<ChatSessionId, Arc<Mutex<()>>>,
}

impl ChatCoordinator {
    /// Create a new coordinator.
    pub fn new(
        store: Arc<dyn ChatStore>,
        verifier: Arc<dyn PrincipalVerifier>,
        registry: Arc<ConnectionRegistry>,
        metrics: Arc<RealtimeMetrics>,
        config: RealtimeConfig,
    ) -> Self {
        Self {
            store,
            verifier,
            registry,
            metrics,
            config,
            session_locks: DashMap::new(),
        }
    }

    /// Decide whether a connection may join `session_id` as `role_label`.
    ///
    /// The session must exist and be active. Customers are admitted on the
    /// session ID alone. Employees must present a credential whose
    /// principal is the session's assignee.
    pub async fn authorize(
        &self,
        session_id: ChatSessionId,
        role_label: &str,
        credential: Option<&str>,
    ) -> AppResult<Participant> {
        let result = self.check_admission(session_id, role_label, credential).await;
        if let Err(e) = &result {
            self.metrics.inc_connections_rejected();
            warn!(%session_id, role = role_label, error = %e, "Chat connection rejected");
        }
        result
    }

    async fn check_admission(
        &self,
        session_id: ChatSessionId,
        role_label: &str,
        credential: Option<&str>,
    ) -> AppResult<Participant> {
        let session = self
            .store
            .find_session(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Chat session {session_id} not found")))?;

        if !session.is_active() {
            return Err(AppError::conflict(format!(
                "Chat session {session_id} is closed"
            )));
        }

        let role: ParticipantRole = role_label.parse()?;
        match role {
            ParticipantRole::Customer => Ok(Participant::customer(session_id)),
            ParticipantRole::Employee => {
                let credential = credential
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| {
                        AppError::authentication("Employee connections require a token")
                    })?;
                let principal = self.verifier.verify(credential).await?;

                if !session.is_assigned_to(principal.employee_id) {
                    return Err(AppError::authorization(
                        "Employee is not assigned to this chat session",
                    ));
                }

                Ok(Participant {
                    session_id,
                    sender: MessageSender::Employee(principal.employee_id),
                })
            }
        }
    }

    /// Register an authorized participant and queue its opening frames.
    ///
    /// The connection receives `connection_established` followed by the
    /// session `history`, possibly empty. Both are queued before the
    /// connection is registered, under the session lock, so a message
    /// stored concurrently is either in the history or relayed after it,
    /// never both. Returns the receiver the transport task must drain.
    pub async fn join(
        &self,
        participant: Participant,
    ) -> AppResult<(ChatConnection, mpsc::Receiver<OutboundMessage>)> {
        // Room for both opening frames before the transport starts draining.
        let (handle, receiver) = ConnectionHandle::new(self.config.channel_buffer_size.max(2));
        let connection = ChatConnection {
            participant,
            handle,
        };
        let deadline = self.registry.send_timeout();

        let lock = self.session_lock(participant.session_id);
        let _guard = lock.lock().await;

        connection
            .handle
            .send(
                builder::connection_established(participant.role(), participant.session_id),
                deadline,
            )
            .await
            .map_err(|e| AppError::internal(format!("Failed to queue opening frame: {e}")))?;

        let messages = self.store.list_messages(participant.session_id).await?;
        connection
            .handle
            .send(builder::history(&messages), deadline)
            .await
            .map_err(|e| AppError::internal(format!("Failed to queue history: {e}")))?;

        self.registry.register(
            participant.session_id,
            participant.role(),
            Arc::clone(&connection.handle),
        );
        self.metrics.inc_connections_opened();
        info!(
            session_id = %participant.session_id,
            role = %participant.role(),
            conn_id = %connection.handle.id,
            history = messages.len(),
            "Chat connection joined"
        );

        Ok((connection, receiver))
    }

    /// Handle one text frame from a connection.
    ///
    /// Invalid frames are answered with an `error` frame and do not end the
    /// connection. A store failure is returned as `Err`; the message is then
    /// neither acknowledged nor relayed.
    pub async fn handle_inbound(
        &self,
        connection: &ChatConnection,
        raw: &str,
    ) -> AppResult<InboundOutcome> {
        self.metrics.inc_messages_received();
        let participant = connection.participant;

        let inbound = match validator::parse_chat_message(raw, self.config.max_message_bytes) {
            Ok(inbound) => inbound,
            Err(e) => {
                self.metrics.inc_messages_rejected();
                debug!(
                    session_id = %participant.session_id,
                    conn_id = %connection.handle.id,
                    reason = %e.message,
                    "Inbound chat frame rejected"
                );
                self.send_to(connection, builder::error(e.message.clone()))
                    .await;
                return Ok(InboundOutcome::Rejected { reason: e.message });
            }
        };

        let lock = self.session_lock(participant.session_id);
        let _guard = lock.lock().await;

        let message = self
            .store
            .append_message(NewChatMessage::new(
                participant.session_id,
                participant.sender,
                inbound.content,
            ))
            .await?;
        self.metrics.inc_messages_persisted();

        let frame = builder::chat_message(&message);
        let acknowledged = self.acknowledge(connection, frame.clone()).await;
        let relayed = self.relay(connection, &frame).await;
        debug!(
            session_id = %participant.session_id,
            message_id = %message.id,
            delivered = relayed.delivered,
            failed = relayed.failed,
            "Chat message relayed"
        );

        Ok(InboundOutcome::Delivered {
            message,
            acknowledged,
            relayed,
        })
    }

    /// Echo a stored message back to the connection that sent it.
    pub async fn acknowledge(&self, connection: &ChatConnection, frame: OutboundMessage) -> bool {
        self.send_to(connection, frame).await
    }

    /// Deliver a stored message to the other side of the session.
    pub async fn relay(&self, connection: &ChatConnection, frame: &OutboundMessage) -> FanOutReport {
        let participant = connection.participant;
        self.registry
            .fan_out(participant.session_id, frame, Some(participant.role()))
            .await
    }

    /// Unregister a connection. The session itself is untouched.
    pub fn leave(&self, connection: &ChatConnection) {
        let participant = connection.participant;
        self.registry.unregister(
            participant.session_id,
            participant.role(),
            connection.handle.id,
        );
        connection.handle.close();
        self.release_session_lock(participant.session_id);
        self.metrics.inc_connections_closed();
        info!(
            session_id = %participant.session_id,
            role = %participant.role(),
            conn_id = %connection.handle.id,
            "Chat connection left"
        );
    }

    fn session_lock(&self, session_id: ChatSessionId) -> Arc<Mutex<()>> {
        Arc::clone(self.session_locks.entry(session_id).or_default().value())
    }

    /// Forget the lock of a session nobody is connected to or waiting on.
    fn release_session_lock(&self, session_id: ChatSessionId) {
        if !self.registry.has_session(session_id) {
            self.session_locks
                .remove_if(&session_id, |_, lock| Arc::strong_count(lock) == 1);
        }
    }

    async fn send_to(&self, connection: &ChatConnection, frame: OutboundMessage) -> bool {
        match connection
            .handle
            .send(frame, self.registry.send_timeout())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(conn_id = %connection.handle.id, error = %e, "Dropping chat connection after failed send");
                self.metrics.inc_send_failures();
                self.registry.unregister(
                    connection.participant.session_id,
                    connection.participant.role(),
                    connection.handle.id,
                );
                connection.handle.close();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use dealerchat_auth::{JwtDecoder, JwtEncoder};
    use dealerchat_core::ErrorKind;
    use dealerchat_core::config::AuthConfig;
    use dealerchat_core::types::{EmployeeId, FormInstanceId};
    use dealerchat_database::{MemoryChatStore, SessionCreation};
    use dealerchat_entity::chat::{ChatSession, NewChatSession};
    use dealerchat_entity::employee::{Employee, EmployeeRole};

    use super::*;

    struct Fixture {
        coordinator: ChatCoordinator,
        store: MemoryChatStore,
        registry: Arc<ConnectionRegistry>,
        encoder: JwtEncoder,
        session: ChatSession,
    }

    impl Fixture {
        fn token_for(&self, employee_id: EmployeeId) -> String {
            self.encoder
                .generate_access_token(employee_id, EmployeeRole::SalesExecutive, "Asha")
                .unwrap()
                .access_token
        }
    }

    async fn fixture_with(store: Arc<dyn ChatStore>, seed: &MemoryChatStore) -> Fixture {
        let auth = AuthConfig {
            jwt_secret: "coordinator-test".to_string(),
            ..AuthConfig::default()
        };
        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new(
            Duration::from_millis(50),
            Arc::clone(&metrics),
        ));
        let session = seed
            .create_active_session(NewChatSession {
                form_instance_id: FormInstanceId::new(),
                customer_name: "Ravi".to_string(),
                employee_id: EmployeeId::new(),
            })
            .await
            .unwrap()
            .into_session();

        Fixture {
            coordinator: ChatCoordinator::new(
                store,
                Arc::new(JwtDecoder::new(&auth)),
                Arc::clone(&registry),
                metrics,
                RealtimeConfig::default(),
            ),
            store: seed.clone(),
            registry,
            encoder: JwtEncoder::new(&auth),
            session,
        }
    }

    async fn fixture() -> Fixture {
        let store = MemoryChatStore::new();
        fixture_with(Arc::new(store.clone()), &store).await
    }

    async fn connect(
        fx: &Fixture,
        role: &str,
        token: Option<&str>,
    ) -> (ChatConnection, mpsc::Receiver<OutboundMessage>) {
        let participant = fx
            .coordinator
            .authorize(fx.session.id, role, token)
            .await
            .unwrap();
        let (conn, mut rx) = fx.coordinator.join(participant).await.unwrap();
        // Skip connection_established and history.
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();
        (conn, rx)
    }

    fn message_data(frame: Option<OutboundMessage>) -> crate::message::MessageView {
        match frame {
            Some(OutboundMessage::Message { data }) => data,
            other => panic!("expected message frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_customer_admitted_by_session_id() {
        let fx = fixture().await;
        let participant = fx
            .coordinator
            .authorize(fx.session.id, "CuStOmEr", None)
            .await
            .unwrap();
        assert_eq!(participant, Participant::customer(fx.session.id));
    }

    #[tokio::test]
    async fn test_rejects_unknown_or_closed_session_and_bad_role() {
        let fx = fixture().await;

        let err = fx
            .coordinator
            .authorize(ChatSessionId::new(), "customer", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = fx
            .coordinator
            .authorize(fx.session.id, "manager", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        fx.store.close_session(fx.session.id).await.unwrap();
        let err = fx
            .coordinator
            .authorize(fx.session.id, "customer", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_employee_must_be_the_assignee() {
        let fx = fixture().await;

        let err = fx
            .coordinator
            .authorize(fx.session.id, "employee", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);

        let err = fx
            .coordinator
            .authorize(fx.session.id, "employee", Some("garbage"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);

        let stranger = fx.token_for(EmployeeId::new());
        let err = fx
            .coordinator
            .authorize(fx.session.id, "employee", Some(&stranger))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let assignee = fx.token_for(fx.session.employee_id);
        let participant = fx
            .coordinator
            .authorize(fx.session.id, "EMPLOYEE", Some(&assignee))
            .await
            .unwrap();
        assert_eq!(
            participant.sender,
            MessageSender::Employee(fx.session.employee_id)
        );
        assert!(!fx.registry.has_session(fx.session.id));
    }

    #[tokio::test]
    async fn test_join_sends_established_then_history() {
        let fx = fixture().await;
        fx.store
            .append_message(NewChatMessage::new(fx.session.id, MessageSender::Customer, "first"))
            .await
            .unwrap();
        fx.store
            .append_message(NewChatMessage::new(
                fx.session.id,
                MessageSender::Employee(fx.session.employee_id),
                "second",
            ))
            .await
            .unwrap();

        let (conn, mut rx) = fx
            .coordinator
            .join(Participant::customer(fx.session.id))
            .await
            .unwrap();

        match rx.recv().await {
            Some(OutboundMessage::ConnectionEstablished {
                role, session_id, ..
            }) => {
                assert_eq!(role, ParticipantRole::Customer);
                assert_eq!(session_id, fx.session.id);
            }
            other => panic!("expected connection_established, got {other:?}"),
        }
        match rx.recv().await {
            Some(OutboundMessage::History { messages }) => {
                let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
                assert_eq!(contents, ["first", "second"]);
            }
            other => panic!("expected history, got {other:?}"),
        }
        assert_eq!(
            fx.registry
                .role_connection_count(fx.session.id, ParticipantRole::Customer),
            1
        );

        fx.coordinator.leave(&conn);
        assert!(!fx.registry.has_session(fx.session.id));
    }

    #[tokio::test]
    async fn test_empty_history_is_still_sent() {
        let fx = fixture().await;
        let (_conn, mut rx) = fx
            .coordinator
            .join(Participant::customer(fx.session.id))
            .await
            .unwrap();
        rx.recv().await.unwrap();
        assert_eq!(
            rx.recv().await,
            Some(OutboundMessage::History { messages: vec![] })
        );
    }

    #[tokio::test]
    async fn test_customer_message_is_acked_and_relayed() {
        let fx = fixture().await;
        let token = fx.token_for(fx.session.employee_id);
        let (customer, mut customer_rx) = connect(&fx, "customer", None).await;
        let (_employee, mut employee_rx) = connect(&fx, "employee", Some(&token)).await;

        let outcome = fx
            .coordinator
            .handle_inbound(&customer, r#"{"content":"Hi","sender_type":"EMPLOYEE"}"#)
            .await
            .unwrap();

        let InboundOutcome::Delivered {
            message,
            acknowledged,
            relayed,
        } = outcome
        else {
            panic!("message should be delivered");
        };
        assert!(acknowledged);
        assert_eq!(relayed, FanOutReport { delivered: 1, failed: 0 });
        assert_eq!(message.sender_type, ParticipantRole::Customer);
        assert_eq!(message.sender_id, None);

        let ack = message_data(customer_rx.recv().await);
        let relayed = message_data(employee_rx.recv().await);
        assert_eq!(ack, relayed);
        assert_eq!(ack.content, "Hi");
        assert!(customer_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_employee_message_carries_identity() {
        let fx = fixture().await;
        let token = fx.token_for(fx.session.employee_id);
        let (employee, _employee_rx) = connect(&fx, "employee", Some(&token)).await;
        let (_customer, mut customer_rx) = connect(&fx, "customer", None).await;

        fx.coordinator
            .handle_inbound(&employee, r#"{"content":"Your quote is ready"}"#)
            .await
            .unwrap();

        let data = message_data(customer_rx.recv().await);
        assert_eq!(data.sender_type, ParticipantRole::Employee);
        assert_eq!(data.sender_id, Some(fx.session.employee_id));
    }

    #[tokio::test]
    async fn test_blank_message_only_errors_the_sender() {
        let fx = fixture().await;
        let token = fx.token_for(fx.session.employee_id);
        let (customer, mut customer_rx) = connect(&fx, "customer", None).await;
        let (_employee, mut employee_rx) = connect(&fx, "employee", Some(&token)).await;

        let outcome = fx
            .coordinator
            .handle_inbound(&customer, r#"{"content":"   "}"#)
            .await
            .unwrap();
        assert!(matches!(outcome, InboundOutcome::Rejected { .. }));

        assert_eq!(
            customer_rx.recv().await,
            Some(OutboundMessage::Error {
                message: "Message content cannot be empty".to_string()
            })
        );
        assert!(employee_rx.try_recv().is_err());
        assert!(fx.store.list_messages(fx.session.id).await.unwrap().is_empty());
        assert_eq!(fx.registry.session_connection_count(fx.session.id), 2);
    }

    #[tokio::test]
    async fn test_dead_sibling_does_not_block_the_sender() {
        let fx = fixture().await;
        let token = fx.token_for(fx.session.employee_id);
        let (customer, mut customer_rx) = connect(&fx, "customer", None).await;
        let (employee, employee_rx) = connect(&fx, "employee", Some(&token)).await;
        drop(employee_rx);

        let outcome = fx
            .coordinator
            .handle_inbound(&customer, r#"{"content":"anyone there?"}"#)
            .await
            .unwrap();

        let InboundOutcome::Delivered { relayed, .. } = outcome else {
            panic!("message should be delivered");
        };
        assert_eq!(relayed, FanOutReport { delivered: 0, failed: 1 });
        assert!(message_data(customer_rx.recv().await).content == "anyone there?");
        assert_eq!(
            fx.registry
                .role_connection_count(fx.session.id, ParticipantRole::Employee),
            0
        );
        assert!(employee.handle.cancellation_token().is_cancelled());
    }

    /// Delegates to a memory store but refuses to write messages.
    #[derive(Debug)]
    struct FailingAppendStore(MemoryChatStore);

    #[async_trait]
    impl ChatStore for FailingAppendStore {
        async fn find_session(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>> {
            self.0.find_session(id).await
        }

        async fn find_active_session_for_form(
            &self,
            form_instance_id: FormInstanceId,
        ) -> AppResult<Option<ChatSession>> {
            self.0.find_active_session_for_form(form_instance_id).await
        }

        async fn list_sessions(&self) -> AppResult<Vec<ChatSession>> {
            self.0.list_sessions().await
        }

        async fn create_active_session(&self, data: NewChatSession) -> AppResult<SessionCreation> {
            self.0.create_active_session(data).await
        }

        async fn close_session(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>> {
            self.0.close_session(id).await
        }

        async fn append_message(&self, _data: NewChatMessage) -> AppResult<ChatMessage> {
            Err(AppError::database("connection reset"))
        }

        async fn list_messages(&self, session_id: ChatSessionId) -> AppResult<Vec<ChatMessage>> {
            self.0.list_messages(session_id).await
        }

        async fn find_available_employee(
            &self,
            role: EmployeeRole,
        ) -> AppResult<Option<Employee>> {
            self.0.find_available_employee(role).await
        }
    }

    #[tokio::test]
    async fn test_store_failure_skips_ack_and_relay() {
        let seed = MemoryChatStore::new();
        let fx = fixture_with(Arc::new(FailingAppendStore(seed.clone())), &seed).await;
        let token = fx.token_for(fx.session.employee_id);
        let (customer, mut customer_rx) = connect(&fx, "customer", None).await;
        let (_employee, mut employee_rx) = connect(&fx, "employee", Some(&token)).await;

        let err = fx
            .coordinator
            .handle_inbound(&customer, r#"{"content":"Hi"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(customer_rx.try_recv().is_err());
        assert!(employee_rx.try_recv().is_err());
    }

    /// Delegates to a memory store. Once armed, the next history read
    /// signals `entered` and waits for `release`.
    #[derive(Debug, Default)]
    struct GatedHistoryStore {
        inner: MemoryChatStore,
        armed: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ChatStore for GatedHistoryStore {
        async fn find_session(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>> {
            self.inner.find_session(id).await
        }

        async fn find_active_session_for_form(
            &self,
            form_instance_id: FormInstanceId,
        ) -> AppResult<Option<ChatSession>> {
            self.inner.find_active_session_for_form(form_instance_id).await
        }

        async fn list_sessions(&self) -> AppResult<Vec<ChatSession>> {
            self.inner.list_sessions().await
        }

        async fn create_active_session(&self, data: NewChatSession) -> AppResult<SessionCreation> {
            self.inner.create_active_session(data).await
        }

        async fn close_session(&self, id: ChatSessionId) -> AppResult<Option<ChatSession>> {
            self.inner.close_session(id).await
        }

        async fn append_message(&self, data: NewChatMessage) -> AppResult<ChatMessage> {
            self.inner.append_message(data).await
        }

        async fn list_messages(&self, session_id: ChatSessionId) -> AppResult<Vec<ChatMessage>> {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.list_messages(session_id).await
        }

        async fn find_available_employee(
            &self,
            role: EmployeeRole,
        ) -> AppResult<Option<Employee>> {
            self.inner.find_available_employee(role).await
        }
    }

    #[tokio::test]
    async fn test_message_sent_during_join_follows_history_once() {
        let seed = MemoryChatStore::new();
        let gated = Arc::new(GatedHistoryStore {
            inner: seed.clone(),
            ..GatedHistoryStore::default()
        });
        let fx = fixture_with(Arc::clone(&gated) as Arc<dyn ChatStore>, &seed).await;
        let token = fx.token_for(fx.session.employee_id);
        let (employee, _employee_rx) = connect(&fx, "employee", Some(&token)).await;

        gated.armed.store(true, Ordering::SeqCst);
        let customer = Participant::customer(fx.session.id);

        let (joined, sent) = tokio::join!(fx.coordinator.join(customer), async {
            gated.entered.notified().await;
            tokio::join!(
                fx.coordinator
                    .handle_inbound(&employee, r#"{"content":"sent during join"}"#),
                async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    gated.release.notify_one();
                }
            )
            .0
        });
        let (_customer, mut customer_rx) = joined.unwrap();
        assert!(matches!(sent.unwrap(), InboundOutcome::Delivered { .. }));

        assert!(matches!(
            customer_rx.recv().await,
            Some(OutboundMessage::ConnectionEstablished { .. })
        ));
        match customer_rx.recv().await {
            Some(OutboundMessage::History { messages }) => assert!(messages.is_empty()),
            other => panic!("expected history frame, got {other:?}"),
        }
        assert_eq!(message_data(customer_rx.recv().await).content, "sent during join");
        assert!(customer_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_last_leave_drops_session_lock() {
        let fx = fixture().await;
        let (customer, _rx) = connect(&fx, "customer", None).await;
        assert!(fx.coordinator.session_locks.contains_key(&fx.session.id));

        fx.coordinator.leave(&customer);
        assert!(!fx.coordinator.session_locks.contains_key(&fx.session.id));
    }
}
