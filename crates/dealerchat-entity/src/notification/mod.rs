//! Push notification events.

pub mod event;

pub use event::NotificationEvent;
