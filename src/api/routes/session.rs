//! WebSocket session endpoint.
//!
//! Each connection gets its own [`crate::session::SessionHandler`]. Text
//! frames are handed to the session as commands; server events are written
//! back as JSON text frames in the order the session emits them.

use crate::MediaRelay;
use crate::api::AppState;
use crate::session::EventReceiver;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use std::sync::Arc;

/// GET /ws - Upgrade to a session WebSocket
#[utoipa::path(
    get,
    path = "/api/ws",
    tag = "session",
    responses(
        (status = 101, description = "Switching to the session protocol")
    )
)]
pub async fn session_socket(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let relay = state.relay.clone();
    ws.on_upgrade(move |socket| serve_session(relay, socket))
}

async fn serve_session(relay: Arc<MediaRelay>, socket: WebSocket) {
    let (session, events) = relay.open_session();
    let session_id = session.id();
    let shutdown = relay.shutdown_token();
    tracing::info!(session = session_id, "client connected");

    let (sink, mut stream) = socket.split();
    let writer = tokio::spawn(forward_events(session_id, events, sink));

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!(session = session_id, "closing session for shutdown");
                break;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => session.handle_message(&text).await,
                Some(Ok(Message::Binary(bytes))) => {
                    session.handle_message(&String::from_utf8_lossy(&bytes)).await
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(session = session_id, error = %e, "websocket read failed");
                    break;
                }
            }
        }
    }

    drop(session);
    writer.abort();
    tracing::info!(session = session_id, "client disconnected");
}

async fn forward_events(
    session_id: u64,
    mut events: EventReceiver,
    mut sink: SplitSink<WebSocket, Message>,
) {
    while let Some(event) = events.recv().await {
        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(session = session_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if sink.send(Message::Text(text)).await.is_err() {
            break;
        }
    }
    let _ = sink.close().await;
}
