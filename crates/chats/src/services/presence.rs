//! Online-user roster.

use crate::entities::{PresenceEntry, RoomName};

use super::ConnectionRegistry;

/// Read-only view of who is logged in where.
#[derive(Clone)]
pub struct PresenceTracker {
    registry: ConnectionRegistry,
}

impl PresenceTracker {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Every logged-in connection in login order, optionally limited to one room.
    ///
    /// Requesters are not filtered out; clients drop their own entry.
    pub async fn online_users(&self, room: Option<&RoomName>) -> Vec<PresenceEntry> {
        self.registry
            .all_logged_in()
            .await
            .iter()
            .filter(|connection| room.map_or(true, |room| connection.is_in(room)))
            .filter_map(PresenceEntry::from_connection)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::outbox;
    use crate::entities::ConnectionId;

    #[tokio::test]
    async fn lists_logged_in_connections_only() {
        let registry = ConnectionRegistry::default();
        let presence = PresenceTracker::new(registry.clone());

        let mut ids = Vec::new();
        for _ in 0..3 {
            let id = ConnectionId::new();
            let (tx, _inbox) = outbox(16);
            registry.register(id.clone(), tx).await;
            ids.push(id);
        }
        registry.set_identity(&ids[0], "alice", "blue").await.unwrap();
        registry.set_identity(&ids[1], "bob", "red").await.unwrap();

        let everyone = presence.online_users(None).await;
        assert_eq!(everyone.len(), 2);
        assert_eq!(everyone[0].username, "alice");
        assert_eq!(everyone[1].room, RoomName::new("red"));

        let red = presence.online_users(Some(&RoomName::new("red"))).await;
        assert_eq!(red.len(), 1);
        assert_eq!(red[0].id, ids[1]);
    }

    #[tokio::test]
    async fn roster_drops_removed_connections() {
        let registry = ConnectionRegistry::default();
        let presence = PresenceTracker::new(registry.clone());
        let id = ConnectionId::new();
        let (tx, _inbox) = outbox(16);

        registry.register(id.clone(), tx).await;
        registry.set_identity(&id, "alice", "blue").await.unwrap();
        assert_eq!(presence.online_users(None).await.len(), 1);

        registry.remove(&id).await;
        assert!(presence.online_users(None).await.is_empty());
    }
}
