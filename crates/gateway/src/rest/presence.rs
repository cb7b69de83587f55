//! Presence roster endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use lobby_chats::PresenceEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::GatewayResult;
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct PresenceResponse {
    pub id: String,
    pub username: String,
    pub room: String,
}

impl From<PresenceEntry> for PresenceResponse {
    fn from(entry: PresenceEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            username: entry.username,
            room: entry.room.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUsersResponse {
    pub online_users: Vec<PresenceResponse>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OnlineUsersQuery {
    /// Only list users in this room.
    pub room: Option<String>,
}

pub fn create_presence_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/online-users", get(online_users))
}

#[utoipa::path(
    get,
    path = "/online-users",
    tag = "Presence",
    params(OnlineUsersQuery),
    responses(
        (status = 200, description = "Every logged-in connection, in login order", body = OnlineUsersResponse),
        (status = 404, description = "Unknown room filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn online_users(
    Query(params): Query<OnlineUsersQuery>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<OnlineUsersResponse>> {
    let hub = state.hub();
    let room = params
        .room
        .as_deref()
        .map(|name| hub.room_set().resolve(name))
        .transpose()?;

    let entries = hub.presence().online_users(room.as_ref()).await;
    Ok(Json(OnlineUsersResponse {
        online_users: entries.into_iter().map(PresenceResponse::from).collect(),
    }))
}
