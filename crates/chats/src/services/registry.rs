//! Live connections and their identities.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::entities::{Connection, ConnectionId, Identity, RoomName, RoomSet};
use crate::types::{ChatError, ChatResult, ServerEvent};

/// Outbound half of a connection's event queue.
pub type Outbox = mpsc::Sender<ServerEvent>;

/// Receiving half of a connection's event queue, drained by its transport.
pub type Inbox = mpsc::Receiver<ServerEvent>;

/// Create a bounded event queue for one connection.
///
/// A connection whose queue fills up is cut off: the registry drops its
/// outbox, the transport sees the queue close and tears the session down.
pub fn outbox(capacity: usize) -> (Outbox, Inbox) {
    mpsc::channel(capacity.max(1))
}

struct Entry {
    connection: Connection,
    /// `None` once the connection fell too far behind
    outbox: Option<Outbox>,
    /// Position in login order; `None` while anonymous
    login_seq: Option<u64>,
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<ConnectionId, Entry>,
    next_login_seq: u64,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Delivery {
    delivered: usize,
    overflowed: Vec<ConnectionId>,
}

/// Tracks every live connection and, once set, its identity.
///
/// All mutations go through one lock, so identity assignment and removal are
/// linearizable.
#[derive(Clone)]
pub struct ConnectionRegistry {
    rooms: RoomSet,
    state: Arc<RwLock<RegistryState>>,
}

impl ConnectionRegistry {
    pub fn new(rooms: RoomSet) -> Self {
        Self {
            rooms,
            state: Arc::new(RwLock::new(RegistryState::default())),
        }
    }

    pub fn rooms(&self) -> &RoomSet {
        &self.rooms
    }

    /// Track a freshly opened transport as an anonymous connection.
    pub async fn register(&self, id: ConnectionId, outbox: Outbox) {
        let mut state = self.state.write().await;
        state.entries.insert(
            id.clone(),
            Entry {
                connection: Connection::anonymous(id),
                outbox: Some(outbox),
                login_seq: None,
            },
        );
    }

    /// Assign username and room to a connection, at most once.
    ///
    /// Nothing changes when this fails.
    pub async fn set_identity(
        &self,
        id: &ConnectionId,
        username: impl Into<String>,
        room: &str,
    ) -> ChatResult<Connection> {
        let mut state = self.state.write().await;
        let seq = state.next_login_seq;

        let entry = state
            .entries
            .get_mut(id)
            .ok_or(ChatError::UnknownConnection)?;

        if entry.connection.is_logged_in() {
            return Err(ChatError::AlreadyLoggedIn);
        }

        let room = self.rooms.resolve(room)?;

        entry.connection.identity = Some(Identity {
            username: username.into(),
            room,
        });
        entry.login_seq = Some(seq);
        let connection = entry.connection.clone();
        state.next_login_seq += 1;

        Ok(connection)
    }

    /// Forget a connection. Unknown or already removed ids are a no-op.
    pub async fn remove(&self, id: &ConnectionId) -> Option<Connection> {
        let mut state = self.state.write().await;
        state.entries.remove(id).map(|entry| entry.connection)
    }

    pub async fn get(&self, id: &ConnectionId) -> Option<Connection> {
        let state = self.state.read().await;
        state.entries.get(id).map(|entry| entry.connection.clone())
    }

    /// Logged-in connections in login order.
    pub async fn all_logged_in(&self) -> Vec<Connection> {
        let state = self.state.read().await;
        let mut logged_in: Vec<_> = state
            .entries
            .values()
            .filter_map(|entry| entry.login_seq.map(|seq| (seq, entry.connection.clone())))
            .collect();
        logged_in.sort_by_key(|(seq, _)| *seq);
        logged_in.into_iter().map(|(_, connection)| connection).collect()
    }

    /// Ids of the connections currently assigned to `room`, in login order.
    pub async fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        self.all_logged_in()
            .await
            .into_iter()
            .filter(|connection| connection.is_in(room))
            .map(|connection| connection.id)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Queue an event for one connection. Returns `false` if it is gone.
    pub async fn send_to(&self, id: &ConnectionId, event: ServerEvent) -> bool {
        let delivery = {
            let state = self.state.read().await;
            Self::deliver(state.entries.get_key_value(id).into_iter(), &event)
        };
        let delivered = delivery.delivered == 1;
        self.cut_off(delivery.overflowed).await;
        delivered
    }

    /// Queue an event for every registered connection, logged in or not,
    /// except `except`.
    pub async fn broadcast(&self, except: Option<&ConnectionId>, event: ServerEvent) -> usize {
        let delivery = {
            let state = self.state.read().await;
            Self::deliver(
                state.entries.iter().filter(|(id, _)| Some(*id) != except),
                &event,
            )
        };
        self.finish(delivery).await
    }

    /// Queue an event for every logged-in connection except `except`.
    pub async fn broadcast_logged_in(
        &self,
        except: Option<&ConnectionId>,
        event: ServerEvent,
    ) -> usize {
        let delivery = {
            let state = self.state.read().await;
            Self::deliver(
                state
                    .entries
                    .iter()
                    .filter(|(id, entry)| entry.connection.is_logged_in() && Some(*id) != except),
                &event,
            )
        };
        self.finish(delivery).await
    }

    /// Queue an event for every member of `room` except `except`.
    pub async fn fan_out(
        &self,
        room: &RoomName,
        except: Option<&ConnectionId>,
        event: ServerEvent,
    ) -> usize {
        let delivery = {
            let state = self.state.read().await;
            Self::deliver(
                state
                    .entries
                    .iter()
                    .filter(|(id, entry)| entry.connection.is_in(room) && Some(*id) != except),
                &event,
            )
        };
        self.finish(delivery).await
    }

    async fn finish(&self, delivery: Delivery) -> usize {
        self.cut_off(delivery.overflowed).await;
        delivery.delivered
    }

    fn deliver<'a>(
        recipients: impl Iterator<Item = (&'a ConnectionId, &'a Entry)>,
        event: &ServerEvent,
    ) -> Delivery {
        let mut delivery = Delivery::default();
        for (id, entry) in recipients {
            let Some(outbox) = &entry.outbox else {
                continue;
            };
            match outbox.try_send(event.clone()) {
                Ok(()) => delivery.delivered += 1,
                Err(TrySendError::Full(_)) => delivery.overflowed.push(id.clone()),
                Err(TrySendError::Closed(_)) => {
                    debug!(connection_id = %id, "outbox closed, skipping recipient");
                }
            }
        }
        delivery
    }

    /// Drop the outboxes of connections that stopped draining their queue.
    ///
    /// The entries stay registered until their transport closes the session,
    /// so the usual departure notice still goes out.
    async fn cut_off(&self, overflowed: Vec<ConnectionId>) {
        if overflowed.is_empty() {
            return;
        }
        let mut state = self.state.write().await;
        for id in overflowed {
            if let Some(entry) = state.entries.get_mut(&id) {
                if entry.outbox.take().is_some() {
                    warn!(connection_id = %id, "outbox full, disconnecting slow consumer");
                }
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(RoomSet::default())
    }
}
