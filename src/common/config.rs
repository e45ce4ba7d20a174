//! Configuration file loading and first-run bootstrap.
//!
//! The coordinator refuses to run with empty credentials: on first run with
//! no config file present it writes a template and exits, so the streamer
//! fills in real values instead of the bot silently failing to authenticate.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bind address for the game-client relay socket
const DEFAULT_RELAY_HOST: &str = "127.0.0.1";
/// Default port for the game-client relay socket
const DEFAULT_RELAY_PORT: u16 = 1949;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config file was present; a template has been written in its place
    #[error("no config file found at '{0}' - a template has been created, please fill it")]
    TemplateCreated(PathBuf),

    /// The config file exists but the chat credentials are empty
    #[error("chat credentials in '{0}' are empty, please fill them")]
    MissingCredentials(PathBuf),

    /// File I/O error
    #[error("failed to read or write config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Chat-platform credentials and channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Bot account login name
    pub username: String,
    /// OAuth access token (without the "oauth:" prefix)
    pub token: String,
    /// Channel to join and listen on
    pub channel: String,
    /// App client id, required only for token refresh
    #[serde(default)]
    pub client_id: Option<String>,
    /// App client secret, required only for token refresh
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Refresh token, required only for token refresh
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Relay socket bind address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_relay_host")]
    pub host: String,
    #[serde(default = "default_relay_port")]
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_relay_host(),
            port: default_relay_port(),
        }
    }
}

fn default_relay_host() -> String {
    DEFAULT_RELAY_HOST.to_string()
}

fn default_relay_port() -> u16 {
    DEFAULT_RELAY_PORT
}

/// OBS scene-text settings (optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObsConfig {
    /// obs-websocket URL, e.g. "ws://127.0.0.1:4455"
    pub url: String,
    /// Name of the text source to update
    pub source: String,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chat: ChatConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub obs: Option<ObsConfig>,
}

impl Config {
    /// Load the configuration from the given path.
    ///
    /// On first run (file missing) a template is written and
    /// `ConfigError::TemplateCreated` is returned; the caller is expected to
    /// exit with a failure status.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            fs::write(path, Self::template_json())?;
            return Err(ConfigError::TemplateCreated(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;

        if config.chat.username.trim().is_empty()
            || config.chat.token.trim().is_empty()
            || config.chat.channel.trim().is_empty()
        {
            return Err(ConfigError::MissingCredentials(path.to_path_buf()));
        }

        Ok(config)
    }

    /// Template written on first run, with empty credentials to fill in
    pub fn template_json() -> String {
        let template = serde_json::json!({
            "_note": "create bot credentials at https://dev.twitch.tv/console",
            "chat": {
                "username": "",
                "token": "",
                "channel": ""
            },
            "relay": {
                "host": DEFAULT_RELAY_HOST,
                "port": DEFAULT_RELAY_PORT
            }
        });
        serde_json::to_string_pretty(&template).expect("template is valid JSON")
    }
}
