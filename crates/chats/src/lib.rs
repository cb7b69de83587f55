//! # Lobby Chats Crate
//!
//! The chat core behind the Lobby server: who is connected, who is logged in,
//! which room each connection belongs to, and how messages reach a room.
//!
//! ## Architecture
//!
//! - **Entities**: Domain models (Connection, Message, RoomName, PresenceEntry)
//! - **Services**: ConnectionRegistry, RoomStore, PresenceTracker, MessageRouter
//!   and the per-connection Session state machine, bundled by [`ChatHub`]
//! - **Types**: Errors and the socket event vocabulary
//! - **Utils**: Input validation
//!
//! ## Usage
//!
//! ```rust
//! use lobby_chats::{ChatHub, ClientEvent, ServerEvent, SetUsernamePayload};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let hub = ChatHub::default();
//! let (tx, mut inbox) = hub.outbox();
//! let mut session = hub.open_session(tx).await;
//!
//! session
//!     .handle(ClientEvent::SetUsername(SetUsernamePayload {
//!         username: "alice".into(),
//!         room: "blue".into(),
//!     }))
//!     .await
//!     .unwrap();
//!
//! assert!(matches!(inbox.recv().await, Some(ServerEvent::Connect { .. })));
//! assert_eq!(inbox.recv().await, Some(ServerEvent::LoggedIn));
//! # }
//! ```

pub mod entities;
pub mod services;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use entities::{Connection, ConnectionId, Identity, Message, PresenceEntry, RoomName, RoomSet};
pub use services::{
    outbox, ChatHub, ConnectionRegistry, Inbox, MessageRouter, Outbox, PresenceTracker, RoomStore,
    Session, SessionState,
};
pub use types::{
    ChatError, ChatResult, ClientEvent, OutgoingMessage, SendMessagePayload, ServerEvent,
    SetUsernamePayload,
};
pub use utils::{ChatLimits, Validator};
