//! Socket event vocabulary.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`; events
//! without a payload omit `data`.

use serde::{Deserialize, Serialize};

use crate::entities::{ConnectionId, Message};
use crate::types::ChatError;

/// Events received from a socket client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Log in with a display name and pick a room
    #[serde(rename = "setUsername")]
    SetUsername(SetUsernamePayload),
    /// Post a message to the connection's room
    #[serde(rename = "sendMessage")]
    SendMessage(SendMessagePayload),
    /// Keep-alive
    #[serde(rename = "ping")]
    Ping,
}

impl ClientEvent {
    /// Decode a single text frame.
    pub fn from_frame(frame: &str) -> Result<Self, ChatError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::SetUsername(_) => "setUsername",
            ClientEvent::SendMessage(_) => "sendMessage",
            ClientEvent::Ping => "ping",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetUsernamePayload {
    pub username: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessagePayload {
    pub message: OutgoingMessage,
    pub room: String,
}

/// A message as the client sends it.
///
/// `id` and `sender` are accepted for compatibility but never trusted; the
/// server derives both from the connection that sent the frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Events sent to socket clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// First frame on every connection
    #[serde(rename = "connect")]
    Connect { id: ConnectionId },
    /// Login accepted; sent to the connection that logged in
    #[serde(rename = "loggedin")]
    LoggedIn,
    /// Presence changed; recipients re-fetch `/online-users`
    #[serde(rename = "newConnection")]
    NewConnection,
    /// A message posted by another member of the room
    #[serde(rename = "message")]
    Message(Message),
    /// A rejected action, sent to the originating connection only
    #[serde(rename = "error")]
    Error { code: String, message: String },
    /// Keep-alive response
    #[serde(rename = "pong")]
    Pong,
}

impl From<&ChatError> for ServerEvent {
    fn from(error: &ChatError) -> Self {
        ServerEvent::Error {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}
