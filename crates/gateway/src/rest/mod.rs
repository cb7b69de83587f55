//! REST API endpoints for the gateway

pub mod health;
pub mod presence;
pub mod rooms;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::GatewayState;

/// Create all REST API routes
pub fn create_rest_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Presence roster
        .merge(presence::create_presence_routes())
        // Room history
        .merge(rooms::create_room_routes())
}

pub use health::HealthResponse;
pub use presence::{OnlineUsersQuery, OnlineUsersResponse, PresenceResponse};
pub use rooms::{ChatHistoryResponse, MessageResponse};
