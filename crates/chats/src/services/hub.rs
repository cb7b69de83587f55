//! Wiring of the chat services into one shareable handle.

use crate::entities::RoomSet;
use crate::utils::ChatLimits;

use crate::entities::ConnectionId;

use super::{
    registry, ConnectionRegistry, Inbox, MessageRouter, Outbox, PresenceTracker, RoomStore,
    Session,
};

/// Cheap-to-clone handle to the shared chat state of one server process.
#[derive(Clone)]
pub struct ChatHub {
    registry: ConnectionRegistry,
    rooms: RoomStore,
    presence: PresenceTracker,
    router: MessageRouter,
    limits: ChatLimits,
}

impl ChatHub {
    pub fn new(rooms: RoomSet, limits: ChatLimits) -> Self {
        let registry = ConnectionRegistry::new(rooms);
        let store = RoomStore::new(registry.clone());
        let presence = PresenceTracker::new(registry.clone());
        let router = MessageRouter::new(registry.clone(), store.clone(), limits);

        Self {
            registry,
            rooms: store,
            presence,
            router,
            limits,
        }
    }

    /// A bounded event queue sized by [`ChatLimits::outbox_capacity`].
    pub fn outbox(&self) -> (Outbox, Inbox) {
        registry::outbox(self.limits.outbox_capacity)
    }

    /// Register a new transport connection under a fresh id.
    pub async fn open_session(&self, outbox: Outbox) -> Session {
        Session::open(self, outbox).await
    }

    /// Register a new transport connection under the transport's own id.
    pub async fn open_session_with_id(&self, id: ConnectionId, outbox: Outbox) -> Session {
        Session::open_with_id(self, id, outbox).await
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    pub fn room_set(&self) -> &RoomSet {
        self.registry.rooms()
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn limits(&self) -> &ChatLimits {
        &self.limits
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new(RoomSet::default(), ChatLimits::default())
    }
}
