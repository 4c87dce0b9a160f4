//! Per-user notification connections and best-effort event dispatch.

pub mod dispatcher;
pub mod events;

pub use dispatcher::{DispatchReport, NotificationConnection, NotificationDispatcher};
