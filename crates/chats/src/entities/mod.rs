//! Domain entities for the chat core.

pub mod connection;
pub mod message;
pub mod presence;
pub mod room;

pub use connection::{Connection, ConnectionId, Identity};
pub use message::Message;
pub use presence::PresenceEntry;
pub use room::{RoomName, RoomSet};
