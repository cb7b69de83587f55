//! Room history endpoint

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use lobby_chats::Message;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub text: String,
    /// Connection id of the author.
    pub id: String,
    pub sender: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            text: message.text,
            id: message.id.to_string(),
            sender: message.sender,
            timestamp: message.timestamp,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryResponse {
    pub chat_history: Vec<MessageResponse>,
}

pub fn create_room_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/room/:room", get(room_history))
}

#[utoipa::path(
    get,
    path = "/room/{room}",
    tag = "Rooms",
    params(
        ("room" = String, Path, description = "Room name")
    ),
    responses(
        (status = 200, description = "Messages posted to the room, oldest first", body = ChatHistoryResponse),
        (status = 404, description = "Unknown room", body = crate::error::ErrorResponse)
    )
)]
pub async fn room_history(
    Path(room): Path<String>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<ChatHistoryResponse>> {
    let history = state.hub().rooms().history_of(&room).await?;
    tracing::debug!(room = %room, messages = history.len(), "serving room history");

    Ok(Json(ChatHistoryResponse {
        chat_history: history.into_iter().map(MessageResponse::from).collect(),
    }))
}
