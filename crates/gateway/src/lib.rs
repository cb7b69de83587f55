//! # Lobby Gateway Crate
//!
//! HTTP and WebSocket surface for the lobby chat server. Socket sessions and
//! REST reads are routed to the shared [`lobby_chats::ChatHub`].
//!
//! ## Architecture
//!
//! - **REST**: presence roster, room history and health, with OpenAPI documentation
//! - **socket.io**: `/socket.io/` for the browser client, one chat session per socket
//! - **WebSocket**: the same sessions over raw JSON `{event, data}` frames
//! - **State**: the shared hub behind an `Arc`
//! - **Middleware**: request logging and CORS
//!
//! ## Usage
//!
//! ```no_run
//! use lobby_chats::ChatHub;
//! use lobby_gateway::{create_router, GatewayState};
//!
//! # async fn run() -> std::io::Result<()> {
//! let app = create_router(GatewayState::new(ChatHub::default()));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3030").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

pub mod docs;
pub mod error;
pub mod middleware;
pub mod rest;
pub mod socketio;
pub mod state;
pub mod websocket;

pub use docs::ApiDoc;
pub use error::{GatewayError, GatewayResult};
pub use state::GatewayState;

pub use create_router as build_router;

use axum::{http::Method, middleware as axum_middleware, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);
    Router::new()
        // REST API routes
        .merge(rest::create_rest_routes().with_state(arc_state.clone()))
        // WebSocket routes
        .merge(websocket::create_websocket_routes().with_state(arc_state.clone()))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Answers `/socket.io/` before routing
        .layer(socketio::create_socketio_layer(arc_state))
        // Browsers on any origin may read the roster and history
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers(Any),
        )
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
