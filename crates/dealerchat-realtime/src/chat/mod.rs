//! Chat session admission, relay, and administrative lifecycle.

pub mod coordinator;
pub mod lifecycle;
pub mod participant;

pub use coordinator::{ChatConnection, ChatCoordinator, InboundOutcome};
pub use lifecycle::SessionLifecycle;
pub use participant::Participant;
