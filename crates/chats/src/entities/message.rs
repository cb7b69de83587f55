use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ConnectionId;

/// A chat utterance as stored in room history and delivered to clients.
///
/// Immutable once appended to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    /// Id of the sending connection
    pub id: ConnectionId,
    /// Username registered by the sending connection
    pub sender: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Message {
    /// Build a message, keeping a plausible client timestamp and falling
    /// back to the server clock otherwise.
    pub fn new(
        text: impl Into<String>,
        id: ConnectionId,
        sender: impl Into<String>,
        client_timestamp: Option<i64>,
    ) -> Self {
        let timestamp = client_timestamp
            .filter(|timestamp| *timestamp > 0)
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        Self {
            text: text.into(),
            id,
            sender: sender.into(),
            timestamp,
        }
    }
}
