//! Chat session and message entities.

pub mod message;
pub mod role;
pub mod session;

pub use message::{ChatMessage, MessageSender, NewChatMessage};
pub use role::ParticipantRole;
pub use session::{ChatSession, NewChatSession, SessionStatus};
