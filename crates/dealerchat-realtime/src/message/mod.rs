//! Wire frames exchanged over chat and notification sockets.

pub mod builder;
pub mod serializer;
pub mod types;
pub mod validator;

pub use types::{InboundChatMessage, MessageView, OutboundMessage};
