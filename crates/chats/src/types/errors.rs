//! Error types for the chat core.

use thiserror::Error;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Every way a chat action can be rejected.
///
/// All variants are recoverable: they are reported to the originating
/// connection only and never affect other connections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("connection is already logged in")]
    AlreadyLoggedIn,

    #[error("unknown room: {room}")]
    InvalidRoom { room: String },

    #[error("connection has not logged in")]
    NotLoggedIn,

    #[error("message text is empty")]
    EmptyText,

    #[error("unknown connection")]
    UnknownConnection,

    #[error("invalid username: {reason}")]
    InvalidUsername { reason: String },

    #[error("message is longer than {max} characters")]
    MessageTooLong { max: usize },

    #[error("connection is not a member of room {room}")]
    NotInRoom { room: String },

    #[error("malformed event: {reason}")]
    MalformedEvent { reason: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl ChatError {
    /// Create an invalid room error
    pub fn invalid_room(room: impl Into<String>) -> Self {
        Self::InvalidRoom { room: room.into() }
    }

    /// Create an invalid username error
    pub fn invalid_username(reason: impl Into<String>) -> Self {
        Self::InvalidUsername {
            reason: reason.into(),
        }
    }

    /// Create a malformed event error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Stable identifier sent to clients in `error` events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyLoggedIn => "already_logged_in",
            Self::InvalidRoom { .. } => "invalid_room",
            Self::NotLoggedIn => "not_logged_in",
            Self::EmptyText => "empty_text",
            Self::UnknownConnection => "unknown_connection",
            Self::InvalidUsername { .. } => "invalid_username",
            Self::MessageTooLong { .. } => "message_too_long",
            Self::NotInRoom { .. } => "not_in_room",
            Self::MalformedEvent { .. } => "malformed_event",
            Self::Configuration { .. } => "configuration",
        }
    }

    /// Stray events for a torn-down connection are dropped silently.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::UnknownConnection)
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedEvent {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_snake_case_and_distinct() {
        let errors = [
            ChatError::AlreadyLoggedIn,
            ChatError::invalid_room("purple"),
            ChatError::NotLoggedIn,
            ChatError::EmptyText,
            ChatError::UnknownConnection,
            ChatError::invalid_username("empty"),
            ChatError::MessageTooLong { max: 10 },
            ChatError::NotInRoom { room: "red".into() },
            ChatError::malformed("eof"),
            ChatError::configuration("no rooms"),
        ];

        let mut codes: Vec<_> = errors.iter().map(ChatError::code).collect();
        assert!(codes.iter().all(|code| code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == '_')));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn unknown_connection_is_not_reported() {
        assert!(!ChatError::UnknownConnection.is_reportable());
        assert!(ChatError::invalid_room("purple").is_reportable());
    }

    #[test]
    fn json_errors_become_malformed_events() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ChatError::from(err).code(), "malformed_event");
    }
}
