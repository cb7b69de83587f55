//! Chat services.
//!
//! The registry is the single source of truth for connections; every other
//! service reads membership and presence through it.

pub mod hub;
pub mod presence;
pub mod registry;
pub mod room_store;
pub mod router;
pub mod session;

pub use hub::ChatHub;
pub use presence::PresenceTracker;
pub use registry::{outbox, ConnectionRegistry, Inbox, Outbox};
pub use room_store::RoomStore;
pub use router::MessageRouter;
pub use session::{Session, SessionState};
