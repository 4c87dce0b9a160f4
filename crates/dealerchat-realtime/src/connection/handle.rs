//! Individual WebSocket connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::message::types::OutboundMessage;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Why a send to a connection did not go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendFailure {
    /// The transport side has gone away.
    #[error("connection is closed")]
    Closed,
    /// The outbound queue stayed full past the deadline.
    #[error("send timed out after {0:?}")]
    TimedOut(Duration),
}

/// A handle to a single WebSocket connection.
///
/// Holds the sender half of the connection's bounded outbound queue. The
/// transport task owns the receiver and writes whatever arrives to the
/// socket; it watches the cancellation token to learn when the server has
/// dropped the connection.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound messages
    sender: mpsc::Sender<OutboundMessage>,
    /// Whether the connection is still alive
    alive: AtomicBool,
    /// Fired when the server closes the connection
    cancel: CancellationToken,
}

impl ConnectionHandle {
    /// Create a handle with an outbound queue of `buffer` messages.
    ///
    /// Returns the receiver the transport task drains.
    pub fn new(buffer: usize) -> (Arc<Self>, mpsc::Receiver<OutboundMessage>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let handle = Self {
            id: Uuid::new_v4(),
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
            cancel: CancellationToken::new(),
        };
        (Arc::new(handle), receiver)
    }

    /// Queue a message, waiting at most `deadline` for room.
    pub async fn send(&self, msg: OutboundMessage, deadline: Duration) -> Result<(), SendFailure> {
        if !self.is_alive() {
            return Err(SendFailure::Closed);
        }
        match tokio::time::timeout(deadline, self.sender.send(msg)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => {
                self.mark_dead();
                Err(SendFailure::Closed)
            }
            Err(_) => Err(SendFailure::TimedOut(deadline)),
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && !self.sender.is_closed()
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Mark the connection dead and tell the transport task to hang up.
    pub fn close(&self) {
        self.mark_dead();
        self.cancel.cancel();
    }

    /// Token cancelled when the server closes this connection.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
