//! Per-connection session state machine.
//!
//! ```text
//! Anonymous --setUsername--> LoggedIn --sendMessage--> LoggedIn
//!     \                          |
//!      `------ transport close ---+--> Disconnected
//! ```

use tracing::{info, warn};

use crate::entities::{ConnectionId, Identity, Message};
use crate::types::{
    ChatError, ChatResult, ClientEvent, SendMessagePayload, ServerEvent, SetUsernamePayload,
};
use crate::utils::Validator;

use super::{ChatHub, Outbox};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    LoggedIn(Identity),
    Disconnected,
}

/// Drives one connection from transport open to transport close.
pub struct Session {
    id: ConnectionId,
    state: SessionState,
    hub: ChatHub,
}

impl Session {
    /// Register a new anonymous connection and greet it with its id.
    pub async fn open(hub: &ChatHub, outbox: Outbox) -> Self {
        Self::open_with_id(hub, ConnectionId::new(), outbox).await
    }

    /// Like [`Session::open`], for transports that name their own sockets.
    pub async fn open_with_id(hub: &ChatHub, id: ConnectionId, outbox: Outbox) -> Self {
        // queued before registration so `connect` is always the first frame
        let _ = outbox.try_send(ServerEvent::Connect { id: id.clone() });
        hub.registry().register(id.clone(), outbox).await;

        info!(connection_id = %id, "connection opened");

        Self {
            id,
            state: SessionState::Anonymous,
            hub: hub.clone(),
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn(_))
    }

    /// Decode and apply one text frame.
    pub async fn handle_frame(&mut self, frame: &str) -> ChatResult<()> {
        self.handle_decoded(ClientEvent::from_frame(frame)).await
    }

    /// Apply an event decoded by the transport, reporting decode failures.
    pub async fn handle_decoded(&mut self, decoded: ChatResult<ClientEvent>) -> ChatResult<()> {
        match decoded {
            Ok(event) => self.handle(event).await,
            Err(error) => {
                self.reject("frame", &error).await;
                Err(error)
            }
        }
    }

    /// Apply one client event. Failures are reported to this connection only.
    pub async fn handle(&mut self, event: ClientEvent) -> ChatResult<()> {
        let name = event.name();
        let result = match event {
            ClientEvent::SetUsername(payload) => self.set_username(payload).await,
            ClientEvent::SendMessage(payload) => self.send_message(payload).await.map(|_| ()),
            ClientEvent::Ping => self.pong().await,
        };

        if let Err(error) = &result {
            self.reject(name, error).await;
        }
        result
    }

    async fn set_username(&mut self, payload: SetUsernamePayload) -> ChatResult<()> {
        match self.state {
            SessionState::Anonymous => {}
            SessionState::LoggedIn(_) => return Err(ChatError::AlreadyLoggedIn),
            SessionState::Disconnected => return Err(ChatError::UnknownConnection),
        }

        let username = Validator::username(&payload.username, self.hub.limits())?;
        let connection = self
            .hub
            .registry()
            .set_identity(&self.id, username, &payload.room)
            .await?;
        let identity = connection.identity.ok_or(ChatError::NotLoggedIn)?;

        info!(
            connection_id = %self.id,
            username = %identity.username,
            room = %identity.room,
            "connection logged in"
        );
        self.state = SessionState::LoggedIn(identity);

        let registry = self.hub.registry();
        registry.send_to(&self.id, ServerEvent::LoggedIn).await;
        registry
            .broadcast_logged_in(Some(&self.id), ServerEvent::NewConnection)
            .await;

        Ok(())
    }

    async fn send_message(&mut self, payload: SendMessagePayload) -> ChatResult<Message> {
        match self.state {
            SessionState::LoggedIn(_) => {}
            SessionState::Anonymous => return Err(ChatError::NotLoggedIn),
            SessionState::Disconnected => return Err(ChatError::UnknownConnection),
        }

        self.hub
            .router()
            .submit_at(
                &self.id,
                &payload.room,
                &payload.message.text,
                payload.message.timestamp,
            )
            .await
    }

    async fn pong(&self) -> ChatResult<()> {
        if self.state == SessionState::Disconnected {
            return Err(ChatError::UnknownConnection);
        }
        self.hub.registry().send_to(&self.id, ServerEvent::Pong).await;
        Ok(())
    }

    async fn reject(&self, event: &str, error: &ChatError) {
        if !error.is_reportable() {
            return;
        }
        warn!(connection_id = %self.id, event, error = %error, "rejected client event");
        self.hub
            .registry()
            .send_to(&self.id, ServerEvent::from(error))
            .await;
    }

    /// Tear the connection down. Calling this again is a no-op.
    ///
    /// Messages this connection already posted stay in history.
    pub async fn close(&mut self) {
        if self.state == SessionState::Disconnected {
            return;
        }

        let removed = self.hub.registry().remove(&self.id).await;
        self.state = SessionState::Disconnected;

        match removed.and_then(|connection| connection.identity) {
            Some(identity) => {
                let notified = self
                    .hub
                    .registry()
                    .broadcast(None, ServerEvent::NewConnection)
                    .await;
                info!(
                    connection_id = %self.id,
                    username = %identity.username,
                    room = %identity.room,
                    notified,
                    "logged-in connection closed"
                );
            }
            None => info!(connection_id = %self.id, "anonymous connection closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutgoingMessage;
    use crate::services::Inbox;

    async fn open(hub: &ChatHub) -> (Session, Inbox) {
        let (outbox, mut inbox) = hub.outbox();
        let session = Session::open(hub, outbox).await;
        assert_eq!(
            inbox.try_recv().ok(),
            Some(ServerEvent::Connect {
                id: session.id().clone()
            })
        );
        (session, inbox)
    }

    fn set_username(username: &str, room: &str) -> ClientEvent {
        ClientEvent::SetUsername(SetUsernamePayload {
            username: username.into(),
            room: room.into(),
        })
    }

    fn send(text: &str, room: &str) -> ClientEvent {
        ClientEvent::SendMessage(SendMessagePayload {
            message: OutgoingMessage {
                text: text.into(),
                id: None,
                sender: None,
                timestamp: None,
            },
            room: room.into(),
        })
    }

    fn drain(inbox: &mut Inbox) -> Vec<ServerEvent> {
        std::iter::from_fn(|| inbox.try_recv().ok()).collect()
    }

    #[tokio::test]
    async fn login_confirms_to_caller_and_notifies_others() {
        let hub = ChatHub::default();
        let (mut bob, mut bob_inbox) = open(&hub).await;
        bob.handle(set_username("bob", "red")).await.unwrap();
        drain(&mut bob_inbox);

        let (mut anonymous, mut anonymous_inbox) = open(&hub).await;
        let (mut alice, mut alice_inbox) = open(&hub).await;
        alice.handle(set_username("alice", "blue")).await.unwrap();

        assert!(alice.is_logged_in());
        assert_eq!(drain(&mut alice_inbox), vec![ServerEvent::LoggedIn]);
        assert_eq!(drain(&mut bob_inbox), vec![ServerEvent::NewConnection]);
        assert!(drain(&mut anonymous_inbox).is_empty());

        anonymous.close().await;
    }

    #[tokio::test]
    async fn second_login_is_rejected_without_broadcast() {
        let hub = ChatHub::default();
        let (mut alice, mut alice_inbox) = open(&hub).await;
        let (mut bob, mut bob_inbox) = open(&hub).await;
        bob.handle(set_username("bob", "blue")).await.unwrap();
        alice.handle(set_username("alice", "blue")).await.unwrap();
        drain(&mut alice_inbox);
        drain(&mut bob_inbox);

        let err = alice.handle(set_username("alicia", "red")).await.unwrap_err();

        assert_eq!(err, ChatError::AlreadyLoggedIn);
        assert_eq!(
            drain(&mut alice_inbox),
            vec![ServerEvent::from(&ChatError::AlreadyLoggedIn)]
        );
        assert!(drain(&mut bob_inbox).is_empty());
        let stored = hub.registry().get(alice.id()).await.unwrap();
        assert_eq!(stored.username(), Some("alice"));
    }

    #[tokio::test]
    async fn invalid_room_keeps_connection_anonymous() {
        let hub = ChatHub::default();
        let (mut bob, mut bob_inbox) = open(&hub).await;
        bob.handle(set_username("bob", "blue")).await.unwrap();
        drain(&mut bob_inbox);

        let (mut carol, mut carol_inbox) = open(&hub).await;
        let err = carol.handle(set_username("carol", "purple")).await.unwrap_err();

        assert_eq!(err, ChatError::invalid_room("purple"));
        assert_eq!(carol.state(), &SessionState::Anonymous);
        assert_eq!(
            drain(&mut carol_inbox),
            vec![ServerEvent::from(&ChatError::invalid_room("purple"))]
        );
        assert!(drain(&mut bob_inbox).is_empty());
    }

    #[tokio::test]
    async fn sending_before_login_is_rejected() {
        let hub = ChatHub::default();
        let (mut session, mut inbox) = open(&hub).await;

        let err = session.handle(send("hi", "blue")).await.unwrap_err();

        assert_eq!(err, ChatError::NotLoggedIn);
        assert_eq!(drain(&mut inbox), vec![ServerEvent::from(&ChatError::NotLoggedIn)]);
        assert!(hub.rooms().history_of("blue").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_username_is_rejected() {
        let hub = ChatHub::default();
        let (mut session, _inbox) = open(&hub).await;

        let err = session.handle(set_username("  ", "blue")).await.unwrap_err();
        assert_eq!(err.code(), "invalid_username");
        assert_eq!(session.state(), &SessionState::Anonymous);
    }

    #[tokio::test]
    async fn malformed_frames_are_reported() {
        let hub = ChatHub::default();
        let (mut session, mut inbox) = open(&hub).await;

        let err = session.handle_frame("not json").await.unwrap_err();
        assert_eq!(err.code(), "malformed_event");
        assert!(matches!(
            drain(&mut inbox).as_slice(),
            [ServerEvent::Error { code, .. }] if code == "malformed_event"
        ));
    }

    #[tokio::test]
    async fn ping_gets_pong() {
        let hub = ChatHub::default();
        let (mut session, mut inbox) = open(&hub).await;
        session.handle_frame(r#"{"event":"ping"}"#).await.unwrap();
        assert_eq!(drain(&mut inbox), vec![ServerEvent::Pong]);
    }

    #[tokio::test]
    async fn closing_a_logged_in_session_refreshes_peers() {
        let hub = ChatHub::default();
        let (mut alice, _alice_inbox) = open(&hub).await;
        let (mut bob, mut bob_inbox) = open(&hub).await;
        bob.handle(set_username("bob", "red")).await.unwrap();
        alice.handle(set_username("alice", "blue")).await.unwrap();
        drain(&mut bob_inbox);

        alice.close().await;

        assert_eq!(alice.state(), &SessionState::Disconnected);
        assert_eq!(drain(&mut bob_inbox), vec![ServerEvent::NewConnection]);
        assert_eq!(hub.presence().online_users(None).await.len(), 1);

        // second close and stray events are silent no-ops
        alice.close().await;
        assert_eq!(
            alice.handle(send("late", "blue")).await,
            Err(ChatError::UnknownConnection)
        );
        assert!(drain(&mut bob_inbox).is_empty());
    }

    #[tokio::test]
    async fn closing_an_anonymous_session_is_quiet() {
        let hub = ChatHub::default();
        let (mut bob, mut bob_inbox) = open(&hub).await;
        bob.handle(set_username("bob", "red")).await.unwrap();
        drain(&mut bob_inbox);

        let (mut lurker, _inbox) = open(&hub).await;
        lurker.close().await;

        assert!(drain(&mut bob_inbox).is_empty());
        assert_eq!(hub.registry().len().await, 1);
    }

    #[tokio::test]
    async fn departure_notice_reaches_anonymous_connections_too() {
        let hub = ChatHub::default();
        let (mut alice, _alice_inbox) = open(&hub).await;
        alice.handle(set_username("alice", "blue")).await.unwrap();
        let (_lurker, mut lurker_inbox) = open(&hub).await;

        alice.close().await;

        assert_eq!(drain(&mut lurker_inbox), vec![ServerEvent::NewConnection]);
    }

    #[tokio::test]
    async fn transport_ids_are_used_verbatim() {
        let hub = ChatHub::default();
        let (outbox, mut inbox) = hub.outbox();
        let id = ConnectionId::from("sio-socket-1");
        let mut session = hub.open_session_with_id(id.clone(), outbox).await;

        assert_eq!(session.id(), &id);
        assert_eq!(inbox.try_recv().ok(), Some(ServerEvent::Connect { id: id.clone() }));

        session.handle(set_username("alice", "blue")).await.unwrap();
        let roster = hub.presence().online_users(None).await;
        assert_eq!(roster[0].id, id);
    }

    #[tokio::test]
    async fn decode_failures_from_the_transport_are_reported() {
        let hub = ChatHub::default();
        let (mut session, mut inbox) = open(&hub).await;

        let err = session
            .handle_decoded(Err(ChatError::malformed("missing field `room`")))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "malformed_event");
        assert!(matches!(
            drain(&mut inbox).as_slice(),
            [ServerEvent::Error { code, .. }] if code == "malformed_event"
        ));
    }
}
