//! Raw WebSocket endpoints for the gateway
//!
//! Frames are JSON `{event, data}` envelopes. Browser clients using the
//! socket.io library connect through [`crate::socketio`] instead.

pub mod session;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::GatewayState;

/// Create all WebSocket routes
pub fn create_websocket_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/ws", get(session::chat_websocket_handler))
        // Second name for the same JSON-envelope endpoint
        .route("/socket", get(session::chat_websocket_handler))
}

pub use session::chat_websocket_handler;
