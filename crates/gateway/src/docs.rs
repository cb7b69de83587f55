use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::rest::health::health_check,
        crate::rest::presence::online_users,
        crate::rest::rooms::room_history,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::rest::health::HealthResponse,
            crate::rest::presence::PresenceResponse,
            crate::rest::presence::OnlineUsersResponse,
            crate::rest::rooms::MessageResponse,
            crate::rest::rooms::ChatHistoryResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Presence", description = "Who is online, and where"),
        (name = "Rooms", description = "Room message history")
    )
)]
pub struct ApiDoc;
