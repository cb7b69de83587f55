use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "lobby.toml",
    "config/lobby.toml",
    "crates/config/lobby.toml",
    "../lobby.toml",
    "../config/lobby.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Reject configurations the chat core cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.chat.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}

/// Chat core settings.
///
/// ```
/// use lobby_config::ChatConfig;
///
/// let chat = ChatConfig::default();
/// assert_eq!(chat.rooms, vec!["blue".to_string(), "red".to_string()]);
/// assert_eq!(chat.max_username_length, 32);
/// assert!(chat.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "ChatConfig::default_rooms")]
    pub rooms: Vec<String>,
    #[serde(default = "ChatConfig::default_max_username_length")]
    pub max_username_length: usize,
    #[serde(default = "ChatConfig::default_max_message_length")]
    pub max_message_length: usize,
    /// Events buffered per connection before a slow reader is disconnected.
    #[serde(default = "ChatConfig::default_outbox_capacity")]
    pub outbox_capacity: usize,
}

impl ChatConfig {
    fn default_rooms() -> Vec<String> {
        vec!["blue".to_string(), "red".to_string()]
    }

    const fn default_max_username_length() -> usize {
        32
    }

    const fn default_max_message_length() -> usize {
        2000
    }

    const fn default_outbox_capacity() -> usize {
        256
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rooms.is_empty() {
            bail!("chat.rooms must name at least one room");
        }

        let mut seen = HashSet::new();
        for room in &self.rooms {
            if room.trim().is_empty() {
                bail!("chat.rooms contains a blank room name");
            }
            if !seen.insert(room.as_str()) {
                bail!("chat.rooms lists `{room}` more than once");
            }
        }

        if self.max_username_length == 0 {
            bail!("chat.max_username_length must be positive");
        }
        if self.max_message_length == 0 {
            bail!("chat.max_message_length must be positive");
        }
        if self.outbox_capacity == 0 {
            bail!("chat.outbox_capacity must be positive");
        }

        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            rooms: Self::default_rooms(),
            max_username_length: Self::default_max_username_length(),
            max_message_length: Self::default_max_message_length(),
            outbox_capacity: Self::default_outbox_capacity(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use lobby_config::load;
///
/// std::env::remove_var("LOBBY_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let max_username = i64::try_from(defaults.chat.max_username_length).unwrap_or(i64::MAX);
    let max_message = i64::try_from(defaults.chat.max_message_length).unwrap_or(i64::MAX);
    let outbox_capacity = i64::try_from(defaults.chat.outbox_capacity).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("chat.rooms", defaults.chat.rooms.clone())?
        .set_default("chat.max_username_length", max_username)?
        .set_default("chat.max_message_length", max_message)?
        .set_default("chat.outbox_capacity", outbox_capacity)?;

    let environment_overrides = config::Environment::with_prefix("LOBBY")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("chat.rooms")
        .try_parsing(true);

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("LOBBY_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via LOBBY_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    config.validate().context("invalid chat configuration")?;

    debug!(?config, "loaded chat server configuration");
    Ok(config)
}
