use anyhow::{Context, Result};
use lobby_chats::{ChatHub, ChatLimits, RoomSet};
use lobby_config::AppConfig;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::DEBUG)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct ChatServices {
    pub hub: ChatHub,
}

impl ChatServices {
    pub fn initialise(config: &AppConfig) -> Result<Self> {
        config.validate().context("invalid configuration")?;

        let rooms = RoomSet::new(config.chat.rooms.iter().map(String::as_str))
            .context("failed to build room set")?;
        let limits = ChatLimits {
            max_username_length: config.chat.max_username_length,
            max_message_length: config.chat.max_message_length,
            outbox_capacity: config.chat.outbox_capacity,
        };

        info!(
            rooms = ?config.chat.rooms,
            max_username_length = limits.max_username_length,
            max_message_length = limits.max_message_length,
            outbox_capacity = limits.outbox_capacity,
            "chat hub ready"
        );

        Ok(Self {
            hub: ChatHub::new(rooms, limits),
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
