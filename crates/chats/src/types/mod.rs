//! Shared types for the chat core.
//!
//! Error definitions and the event vocabulary exchanged with socket clients.

pub mod errors;
pub mod events;

pub use errors::{ChatError, ChatResult};
pub use events::*;
