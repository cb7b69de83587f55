//! socket.io transport
//!
//! Serves `/socket.io/` for the browser client. Each socket gets one chat
//! [`Session`](lobby_chats::Session) whose connection id is the socket.io
//! `sid`, so the client can recognise its own messages by `socket.id`.
//!
//! socket.io handlers run synchronously in packet order and only queue the
//! decoded event; a per-socket task owns the session, applies queued events
//! and emits whatever the hub sends back.

use std::sync::Arc;

use lobby_chats::{
    ChatError, ChatResult, ClientEvent, ConnectionId, SendMessagePayload, ServerEvent,
    SetUsernamePayload,
};
use serde_json::{json, Value};
use socketioxide::{
    extract::{SocketRef, TryData},
    layer::SocketIoLayer,
    socket::DisconnectReason,
    SocketIo,
};
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    Notify,
};
use tracing::{debug, warn};

use crate::state::GatewayState;

type Inbound = ChatResult<ClientEvent>;

/// Build the tower layer that answers socket.io requests.
pub fn create_socketio_layer(state: Arc<GatewayState>) -> SocketIoLayer {
    let (layer, io) = SocketIo::new_layer();
    io.ns("/", move |socket: SocketRef| on_connect(socket, state.clone()));
    layer
}

fn on_connect(socket: SocketRef, state: Arc<GatewayState>) {
    let capacity = state.hub().limits().outbox_capacity.max(1);
    let (commands, inbound) = mpsc::channel::<Inbound>(capacity);
    let gone = Arc::new(Notify::new());

    let queue = commands.clone();
    socket.on(
        "setUsername",
        move |socket: SocketRef, TryData(data): TryData<SetUsernamePayload>| {
            let decoded = data.map(ClientEvent::SetUsername).map_err(ChatError::from);
            enqueue(&socket, &queue, decoded);
        },
    );

    let queue = commands.clone();
    socket.on(
        "sendMessage",
        move |socket: SocketRef, TryData(data): TryData<SendMessagePayload>| {
            let decoded = data.map(ClientEvent::SendMessage).map_err(ChatError::from);
            enqueue(&socket, &queue, decoded);
        },
    );

    socket.on("ping", move |socket: SocketRef| {
        enqueue(&socket, &commands, Ok(ClientEvent::Ping));
    });

    let signal = gone.clone();
    socket.on_disconnect(move |socket: SocketRef, reason: DisconnectReason| {
        debug!(sid = %socket.id, ?reason, "socket.io client disconnected");
        signal.notify_one();
    });

    tokio::spawn(drive(socket, state, inbound, gone));
}

fn enqueue(socket: &SocketRef, queue: &mpsc::Sender<Inbound>, decoded: Inbound) {
    match queue.try_send(decoded) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!(sid = %socket.id, "inbound queue full, disconnecting socket");
            // already gone if this fails
            let _ = socket.clone().disconnect();
        }
        Err(TrySendError::Closed(_)) => {}
    }
}

async fn drive(
    socket: SocketRef,
    state: Arc<GatewayState>,
    mut inbound: mpsc::Receiver<Inbound>,
    gone: Arc<Notify>,
) {
    let hub = state.hub();
    let (outbox, mut events) = hub.outbox();
    let id = ConnectionId::from(socket.id.to_string());
    let mut session = hub.open_session_with_id(id, outbox).await;

    loop {
        tokio::select! {
            _ = gone.notified() => break,
            decoded = inbound.recv() => match decoded {
                Some(decoded) => {
                    // failures were already reported to the client
                    let _ = session.handle_decoded(decoded).await;
                }
                None => break,
            },
            event = events.recv() => match event {
                Some(event) => {
                    if !emit(&socket, event) {
                        break;
                    }
                }
                None => {
                    // cut off by the registry
                    let _ = socket.clone().disconnect();
                    break;
                }
            },
        }
    }

    session.close().await;
    debug!(connection = %session.id(), "socket.io session finished");
}

/// Translate a hub event into a socket.io emit. Returns `false` once the
/// socket can no longer be written to.
fn emit(socket: &SocketRef, event: ServerEvent) -> bool {
    let (name, data) = match event {
        // the socket.io CONNECT packet already carried the sid
        ServerEvent::Connect { .. } => return true,
        ServerEvent::LoggedIn => ("loggedin", Value::Null),
        ServerEvent::NewConnection => ("newConnection", Value::Null),
        ServerEvent::Pong => ("pong", Value::Null),
        ServerEvent::Error { code, message } => {
            ("error", json!({ "code": code, "message": message }))
        }
        ServerEvent::Message(message) => match serde_json::to_value(&message) {
            Ok(data) => ("message", data),
            Err(error) => {
                warn!(%error, "failed to encode message");
                return true;
            }
        },
    };

    match socket.emit(name, &data) {
        Ok(()) => true,
        Err(error) => {
            debug!(sid = %socket.id, %error, event = name, "socket.io emit failed");
            false
        }
    }
}
