//! Message validation, storage, and fan-out.

use tracing::debug;

use crate::entities::{ConnectionId, Message};
use crate::types::{ChatError, ChatResult, ServerEvent};
use crate::utils::{ChatLimits, Validator};

use super::{ConnectionRegistry, RoomStore};

/// Accepts messages from logged-in connections and delivers them to their room.
#[derive(Clone)]
pub struct MessageRouter {
    registry: ConnectionRegistry,
    rooms: RoomStore,
    limits: ChatLimits,
}

impl MessageRouter {
    pub fn new(registry: ConnectionRegistry, rooms: RoomStore, limits: ChatLimits) -> Self {
        Self {
            registry,
            rooms,
            limits,
        }
    }

    /// Submit a message stamped with the server clock.
    pub async fn submit(
        &self,
        sender: &ConnectionId,
        room: &str,
        text: &str,
    ) -> ChatResult<Message> {
        self.submit_at(sender, room, text, None).await
    }

    /// Submit a message, keeping the client's timestamp when it is usable.
    ///
    /// `sender` and `id` of the stored message always come from the
    /// registered connection. The message is delivered to every other member
    /// of the room while the room's history lock is held, so all recipients
    /// see the room's messages in history order.
    pub async fn submit_at(
        &self,
        sender: &ConnectionId,
        room: &str,
        text: &str,
        client_timestamp: Option<i64>,
    ) -> ChatResult<Message> {
        let connection = self
            .registry
            .get(sender)
            .await
            .ok_or(ChatError::UnknownConnection)?;
        let identity = connection.identity.ok_or(ChatError::NotLoggedIn)?;

        let room = self.rooms.rooms().resolve(room)?;
        if room != identity.room {
            return Err(ChatError::NotInRoom {
                room: room.to_string(),
            });
        }

        Validator::message_text(text, &self.limits)?;

        let message = Message::new(text, sender.clone(), identity.username, client_timestamp);

        let mut history = self.rooms.lock_history(&room).await?;
        history.push(message.clone());
        let recipients = self
            .registry
            .fan_out(&room, Some(sender), ServerEvent::Message(message.clone()))
            .await;
        let position = history.len();
        drop(history);

        debug!(
            connection_id = %sender,
            room = %room,
            position,
            recipients,
            "message accepted"
        );

        Ok(message)
    }
}
