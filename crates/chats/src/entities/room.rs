use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{ChatError, ChatResult};

/// Name of one of the configured rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The fixed enumeration of rooms, decided at startup.
///
/// ```
/// use lobby_chats::RoomSet;
///
/// let rooms = RoomSet::default();
/// assert!(rooms.resolve("blue").is_ok());
/// assert!(rooms.resolve("purple").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSet {
    rooms: Arc<[RoomName]>,
}

impl RoomSet {
    pub fn new<I, S>(names: I) -> ChatResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rooms: Vec<RoomName> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if name.trim().is_empty() {
                return Err(ChatError::configuration("room names must not be blank"));
            }
            if rooms.iter().any(|room| room.as_str() == name) {
                return Err(ChatError::configuration(format!(
                    "room `{name}` is listed more than once"
                )));
            }
            rooms.push(RoomName::new(name));
        }

        if rooms.is_empty() {
            return Err(ChatError::configuration("at least one room is required"));
        }

        Ok(Self {
            rooms: rooms.into(),
        })
    }

    /// Map a client-supplied name onto a configured room.
    pub fn resolve(&self, name: &str) -> ChatResult<RoomName> {
        self.rooms
            .iter()
            .find(|room| room.as_str() == name)
            .cloned()
            .ok_or_else(|| ChatError::invalid_room(name))
    }

    pub fn contains(&self, room: &RoomName) -> bool {
        self.rooms.contains(room)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomName> {
        self.rooms.iter()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for RoomSet {
    fn default() -> Self {
        Self {
            rooms: vec![RoomName::new("blue"), RoomName::new("red")].into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_only_configured_rooms() {
        let rooms = RoomSet::new(["blue", "red"]).unwrap();
        assert_eq!(rooms.resolve("red").unwrap(), RoomName::new("red"));
        assert_eq!(
            rooms.resolve("Red").unwrap_err(),
            ChatError::invalid_room("Red")
        );
        assert_eq!(rooms.len(), 2);
    }

    #[test]
    fn rejects_empty_blank_and_duplicate_sets() {
        assert!(RoomSet::new(Vec::<String>::new()).is_err());
        assert!(RoomSet::new(["blue", " "]).is_err());
        assert!(RoomSet::new(["blue", "blue"]).is_err());
    }
}
