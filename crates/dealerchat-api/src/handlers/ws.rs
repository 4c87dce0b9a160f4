//! WebSocket upgrade handlers for chat and notification connections.

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use dealerchat_core::error::AppError;
use dealerchat_core::types::ChatSessionId;
use dealerchat_realtime::message::serializer::serialize_outbound;
use dealerchat_realtime::{ChatConnection, OutboundMessage};

use crate::error::ApiError;
use crate::state::AppState;

/// Close reasons are limited to 123 bytes by the protocol.
const MAX_CLOSE_REASON_BYTES: usize = 120;

/// Query parameters for WebSocket authentication.
#[derive(Debug, Default, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token. Required for employees.
    pub token: Option<String>,
}

/// GET /ws/chat/{session_id}/{role}?token={jwt}
///
/// The upgrade is always accepted; admission failures close the socket
/// with 1008 so browser clients can observe the reason.
pub async fn chat_ws_handler(
    State(state): State<AppState>,
    Path((session_id, role)): Path<(String, String)>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_chat_socket(state, session_id, role, query.token, socket))
}

async fn handle_chat_socket(
    state: AppState,
    raw_session_id: String,
    role: String,
    token: Option<String>,
    mut socket: WebSocket,
) {
    let chat = &state.realtime.chat;

    let admitted = match raw_session_id.parse::<ChatSessionId>() {
        Ok(session_id) => chat.authorize(session_id, &role, token.as_deref()).await,
        Err(_) => {
            state.realtime.metrics.inc_connections_rejected();
            warn!(session_id = %raw_session_id, role = %role, "Chat connection rejected: malformed session ID");
            Err(AppError::not_found(format!(
                "Chat session {raw_session_id} not found"
            )))
        }
    };
    let participant = match admitted {
        Ok(p) => p,
        Err(e) => {
            close_socket(&mut socket, close_code::POLICY, &e.message).await;
            return;
        }
    };

    let (connection, outbound_rx) = match chat.join(participant).await {
        Ok(joined) => joined,
        Err(e) => {
            error!(session_id = %participant.session_id, error = %e, "Failed to join chat session");
            close_socket(&mut socket, close_code::ERROR, "Internal error").await;
            return;
        }
    };

    let cancel = connection.handle.cancellation_token();
    let (ws_tx, ws_rx) = socket.split();
    let writer = tokio::spawn(forward_outbound(ws_tx, outbound_rx, cancel.clone()));

    let fault = read_chat_frames(&state, &connection, ws_rx, &cancel).await;

    chat.leave(&connection);
    finish(writer, fault, state.realtime.is_shutting_down()).await;
}

/// Drain inbound frames until the client leaves, the connection is
/// cancelled, or a store failure occurs. Returns the close code for a fault.
async fn read_chat_frames(
    state: &AppState,
    connection: &ChatConnection,
    mut ws_rx: SplitStream<WebSocket>,
    cancel: &CancellationToken,
) -> Option<u16> {
    let conn_id = connection.handle.id;
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => return None,
            frame = ws_rx.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                if let Err(e) = state
                    .realtime
                    .chat
                    .handle_inbound(connection, text.as_str())
                    .await
                {
                    error!(%conn_id, error = %e, "Failed to store chat message");
                    return Some(close_code::ERROR);
                }
            }
            Some(Ok(Message::Binary(_))) => {
                debug!(%conn_id, "Ignoring binary frame");
            }
            Some(Ok(Message::Close(_))) | None => return None,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!(%conn_id, error = %e, "WebSocket error");
                return None;
            }
        }
    }
}

/// GET /ws/notifications?token={jwt}
///
/// The credential is checked before the upgrade; a bad token gets a
/// plain 401.
pub async fn notification_ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::authentication("Notification connections require a token"))?;
    let principal = state.verifier.verify(token).await?;

    Ok(ws.on_upgrade(move |socket| async move {
        let notifications = &state.realtime.notifications;
        let (connection, outbound_rx) = notifications.connect(&principal);
        let cancel = connection.handle.cancellation_token();
        let (ws_tx, mut ws_rx) = socket.split();
        let writer = tokio::spawn(forward_outbound(ws_tx, outbound_rx, cancel.clone()));

        // Inbound traffic is not part of the notification protocol.
        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => break,
                frame = ws_rx.next() => frame,
            };
            match frame {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }

        notifications.disconnect(&connection);
        finish(writer, None, state.realtime.is_shutting_down()).await;
    }))
}

/// Writer half: serialize queued frames onto the socket until the queue
/// closes or the connection is cancelled. Hands the sink back for the
/// closing frame.
async fn forward_outbound(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<OutboundMessage>,
    cancel: CancellationToken,
) -> SplitSink<WebSocket, Message> {
    loop {
        let msg = tokio::select! {
            _ = cancel.cancelled() => break,
            msg = outbound_rx.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };

        let text = match serialize_outbound(&msg) {
            Ok(text) => text,
            Err(e) => {
                error!(kind = msg.kind(), error = %e, "Failed to serialize outbound frame");
                continue;
            }
        };
        if ws_tx.send(Message::Text(text.into())).await.is_err() {
            // Peer is gone; stop the reader too.
            cancel.cancel();
            break;
        }
    }
    ws_tx
}

/// Wait for the writer and send the closing frame.
async fn finish(
    writer: tokio::task::JoinHandle<SplitSink<WebSocket, Message>>,
    fault: Option<u16>,
    shutting_down: bool,
) {
    let mut ws_tx = match writer.await {
        Ok(tx) => tx,
        Err(e) => {
            error!(error = %e, "WebSocket writer task failed");
            return;
        }
    };

    let frame = match fault {
        Some(code) => close_frame(code, "Internal error"),
        None if shutting_down => close_frame(close_code::AWAY, "Server shutting down"),
        None => close_frame(close_code::NORMAL, ""),
    };
    let _ = ws_tx.send(frame).await;
    let _ = ws_tx.close().await;
}

async fn close_socket(socket: &mut WebSocket, code: u16, reason: &str) {
    info!(code, reason, "Closing WebSocket");
    let _ = socket.send(close_frame(code, reason)).await;
    let _ = socket.close().await;
}

fn close_frame(code: u16, reason: &str) -> Message {
    let mut end = reason.len().min(MAX_CLOSE_REASON_BYTES);
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    Message::Close(Some(CloseFrame {
        code,
        reason: reason[..end].to_string().into(),
    }))
}
