//! Validation utilities.

use crate::types::{ChatError, ChatResult};

/// Size limits applied to client input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLimits {
    pub max_username_length: usize,
    pub max_message_length: usize,
    /// Events queued for one connection before it is cut off as too slow.
    pub outbox_capacity: usize,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            max_username_length: 32,
            max_message_length: 2000,
            outbox_capacity: 256,
        }
    }
}

/// Validation utilities
pub struct Validator;

impl Validator {
    /// Validate a display name, returning it trimmed.
    pub fn username(username: &str, limits: &ChatLimits) -> ChatResult<String> {
        let username = username.trim();

        if username.is_empty() {
            return Err(ChatError::invalid_username("username cannot be empty"));
        }

        if username.chars().count() > limits.max_username_length {
            return Err(ChatError::invalid_username(format!(
                "username too long (max {} characters)",
                limits.max_username_length
            )));
        }

        if username.chars().any(char::is_control) {
            return Err(ChatError::invalid_username(
                "username cannot contain control characters",
            ));
        }

        Ok(username.to_string())
    }

    /// Validate message text. The text itself is stored untouched.
    pub fn message_text(text: &str, limits: &ChatLimits) -> ChatResult<()> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyText);
        }

        if text.chars().count() > limits.max_message_length {
            return Err(ChatError::MessageTooLong {
                max: limits.max_message_length,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed() {
        let limits = ChatLimits::default();
        assert_eq!(Validator::username("  alice ", &limits).unwrap(), "alice");
    }

    #[test]
    fn username_rejects_blank_long_and_control_input() {
        let limits = ChatLimits {
            max_username_length: 5,
            ..ChatLimits::default()
        };

        assert!(Validator::username("   ", &limits).is_err());
        assert!(Validator::username("abcdef", &limits).is_err());
        assert!(Validator::username("a\u{7}b", &limits).is_err());
        // counted in characters, not bytes
        assert!(Validator::username("ééééé", &limits).is_ok());
    }

    #[test]
    fn message_text_rejects_whitespace_only() {
        let limits = ChatLimits::default();
        assert_eq!(
            Validator::message_text(" \n\t", &limits),
            Err(ChatError::EmptyText)
        );
        assert!(Validator::message_text(" hi ", &limits).is_ok());
    }

    #[test]
    fn message_text_enforces_length() {
        let limits = ChatLimits {
            max_message_length: 3,
            ..ChatLimits::default()
        };
        assert_eq!(
            Validator::message_text("abcd", &limits),
            Err(ChatError::MessageTooLong { max: 3 })
        );
    }
}
