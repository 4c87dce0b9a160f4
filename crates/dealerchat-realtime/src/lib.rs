//! # dealerchat-realtime
//!
//! In-process realtime core: the connection registry, the chat coordinator
//! that authorizes and relays chat traffic, and the notification dispatcher
//! that pushes events to an employee's live connections.

pub mod chat;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod server;

pub use chat::{ChatConnection, ChatCoordinator, InboundOutcome, Participant, SessionLifecycle};
pub use connection::{ConnectionHandle, ConnectionId, ConnectionRegistry, FanOutReport, SendFailure};
pub use message::types::{MessageView, OutboundMessage};
pub use metrics::{MetricsSnapshot, RealtimeMetrics};
pub use notification::{DispatchReport, NotificationConnection, NotificationDispatcher};
pub use server::RealtimeEngine;
