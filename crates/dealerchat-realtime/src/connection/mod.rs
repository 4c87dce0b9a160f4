//! Live connection handles and the registry that routes to them.

pub mod handle;
pub mod registry;

pub use handle::{ConnectionHandle, ConnectionId, SendFailure};
pub use registry::{ConnectionRegistry, FanOutReport};
