//! Per-socket chat session pump

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::state::GatewayState;

/// Upgrade to a WebSocket and run one chat session over it.
pub async fn chat_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<GatewayState>) {
    let (mut ws_sender, mut receiver) = socket.split();

    let (outbox, mut events) = state.hub().outbox();
    let mut session = state.hub().open_session(outbox).await;
    let connection = session.id().clone();

    let mut sender_task = tokio::spawn(async move {
        // ends when the registry cuts this connection off for falling behind
        while let Some(event) = events.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(error) => {
                    tracing::warn!(%error, "failed to encode server event");
                    continue;
                }
            };
            if let Err(error) = ws_sender.send(Message::Text(frame)).await {
                tracing::debug!(%error, "socket write failed");
                break;
            }
        }
    });

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    // failures were already reported to the client
                    let _ = session.handle_frame(&text).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(error)) => {
                    tracing::debug!(%connection, %error, "socket read failed");
                    break;
                }
                // binary frames, pings and pongs carry no chat events
                Some(Ok(_)) => {}
            },
            _ = &mut sender_task => break,
        }
    }

    session.close().await;
    sender_task.abort();
    tracing::debug!(%connection, "socket handler finished");
}
