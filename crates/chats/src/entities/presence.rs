use serde::{Deserialize, Serialize};

use super::{Connection, ConnectionId, RoomName};

/// Roster projection of a logged-in connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub id: ConnectionId,
    pub username: String,
    pub room: RoomName,
}

impl PresenceEntry {
    /// `None` for anonymous connections, which never appear in the roster.
    pub fn from_connection(connection: &Connection) -> Option<Self> {
        connection.identity.as_ref().map(|identity| Self {
            id: connection.id.clone(),
            username: identity.username.clone(),
            room: identity.room.clone(),
        })
    }
}
