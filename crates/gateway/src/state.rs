//! Shared application state for the gateway

use lobby_chats::ChatHub;

/// State shared by every route. Cloning is cheap; the hub is internally shared.
#[derive(Clone, Default)]
pub struct GatewayState {
    hub: ChatHub,
}

impl GatewayState {
    pub fn new(hub: ChatHub) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &ChatHub {
        &self.hub
    }
}
