//! Per-room chat history.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::entities::{ConnectionId, Message, RoomName, RoomSet};
use crate::types::{ChatError, ChatResult};

use super::ConnectionRegistry;

/// Owns the history buffer of every configured room.
///
/// Each room has its own lock, so appends to different rooms never contend.
/// Membership is not stored here; it is read from the registry.
#[derive(Clone)]
pub struct RoomStore {
    histories: Arc<HashMap<RoomName, Mutex<Vec<Message>>>>,
    registry: ConnectionRegistry,
}

impl RoomStore {
    pub fn new(registry: ConnectionRegistry) -> Self {
        let histories = registry
            .rooms()
            .iter()
            .map(|room| (room.clone(), Mutex::new(Vec::new())))
            .collect();

        Self {
            histories: Arc::new(histories),
            registry,
        }
    }

    pub fn rooms(&self) -> &RoomSet {
        self.registry.rooms()
    }

    /// Append a message to history without delivering it to anyone.
    pub async fn append_message(&self, room: &RoomName, message: Message) -> ChatResult<()> {
        self.lock_history(room).await?.push(message);
        Ok(())
    }

    /// Snapshot of a room's history in append order.
    pub async fn history(&self, room: &RoomName) -> ChatResult<Vec<Message>> {
        Ok(self.lock_history(room).await?.clone())
    }

    /// Snapshot of the history of a room named by the client.
    pub async fn history_of(&self, room: &str) -> ChatResult<Vec<Message>> {
        let room = self.rooms().resolve(room)?;
        self.history(&room).await
    }

    pub async fn members(&self, room: &RoomName) -> ChatResult<Vec<ConnectionId>> {
        if !self.rooms().contains(room) {
            return Err(ChatError::invalid_room(room.as_str()));
        }
        Ok(self.registry.members(room).await)
    }

    /// Hold a room's history lock. Fan-out done while holding it observes
    /// the same order as the history itself.
    pub(crate) async fn lock_history(
        &self,
        room: &RoomName,
    ) -> ChatResult<MutexGuard<'_, Vec<Message>>> {
        let history = self
            .histories
            .get(room)
            .ok_or_else(|| ChatError::invalid_room(room.as_str()))?;
        Ok(history.lock().await)
    }
}
