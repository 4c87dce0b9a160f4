//! Real-time WebSocket engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound queue capacity per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Deadline for a single send to one connection, in milliseconds.
    ///
    /// A connection that cannot accept a frame within this window is
    /// treated as dead and unregistered.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_ms: u64,
    /// Maximum accepted size of an inbound chat frame, in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            send_timeout_ms: default_send_timeout(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl RealtimeConfig {
    /// Per-connection send deadline.
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_send_timeout() -> u64 {
    2_000
}

fn default_max_message_bytes() -> usize {
    16_384
}
