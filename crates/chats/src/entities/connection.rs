use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RoomName;

/// Opaque identifier of one live transport session.
///
/// Ids are never reused; a reconnecting client gets a new one. Transports
/// that already name their sockets (socket.io session ids) keep that name so
/// clients can recognise themselves in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name and room of a logged-in connection.
///
/// Both are assigned together, exactly once per connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub room: RoomName,
}

/// Snapshot of a registered connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    /// `None` while the connection is anonymous
    pub identity: Option<Identity>,
}

impl Connection {
    pub fn anonymous(id: ConnectionId) -> Self {
        Self { id, identity: None }
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.username.as_str())
    }

    pub fn room(&self) -> Option<&RoomName> {
        self.identity.as_ref().map(|identity| &identity.room)
    }

    pub fn is_in(&self, room: &RoomName) -> bool {
        self.room() == Some(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_serialize_as_strings() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        assert_ne!(a, b);

        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json, serde_json::Value::String(a.to_string()));
    }

    #[test]
    fn transport_names_are_kept_verbatim() {
        let id = ConnectionId::from("Ab3_xYz9QwErTy12");
        assert_eq!(id.as_str(), "Ab3_xYz9QwErTy12");
        assert_eq!(id.to_string(), "Ab3_xYz9QwErTy12");
    }

    #[test]
    fn anonymous_connection_has_no_room() {
        let connection = Connection::anonymous(ConnectionId::new());
        assert!(!connection.is_logged_in());
        assert!(connection.username().is_none());
        assert!(!connection.is_in(&RoomName::new("blue")));
    }
}
