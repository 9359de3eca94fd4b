//! Configuration file handling
//!
//! The config lives in `~/.config/sailpad/config.toml` unless a path is given
//! on the command line. A missing default file is not an error, every section
//! falls back to the values the boat has been driven with so far:
//!
//! ```toml
//! [link]
//! transport = "websocket"   # or "mqtt"
//! host = "192.168.0.21"
//! port = 13000
//! path = "/"
//!
//! [link.mqtt]
//! topic = "sailbot/manual_cmd"
//!
//! [device]
//! poll_timeout_ms = 20
//!
//! [display]
//! echo = true
//!
//! [axes.rudder]
//! negative = "RJ/Left"
//! positive = "RJ/Right"
//! pairing = "summed"
//! deadband_radius = 20.0
//! span = 127.0
//! gain = 0.5
//! invert = true
//! ```

use crate::controller::DeviceSettings;
use crate::mapping::{AxisProfile, CommandMapper, MappingError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const CONFIG_DIR: &str = "sailpad";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_WEBSOCKET_PORT: u16 = 13000;
pub const DEFAULT_MQTT_PORT: u16 = 1883;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Invalid axis mapping: {0}")]
    Mapping(#[from] MappingError),
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub link: LinkConfig,
    pub device: DeviceConfig,
    pub display: DisplayConfig,
    pub axes: AxesConfig,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    #[value(name = "websocket")]
    WebSocket,
    #[value(name = "mqtt")]
    Mqtt,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LinkConfig {
    pub transport: Transport,
    pub host: String,
    /// Transport default when unset
    pub port: Option<u16>,
    /// WebSocket request path
    pub path: String,
    pub mqtt: MqttConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            transport: Transport::WebSocket,
            host: String::new(),
            port: None,
            path: "/".to_string(),
            mqtt: MqttConfig::default(),
        }
    }
}

impl LinkConfig {
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(match self.transport {
            Transport::WebSocket => DEFAULT_WEBSOCKET_PORT,
            Transport::Mqtt => DEFAULT_MQTT_PORT,
        })
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MqttConfig {
    pub topic: String,
    pub client_id: String,
    pub keep_alive_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            topic: "sailbot/manual_cmd".to_string(),
            client_id: "sailpad".to_string(),
            keep_alive_secs: 5,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    pub gamepad_index: Option<usize>,
    pub poll_timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            gamepad_index: None,
            poll_timeout_ms: 20,
        }
    }
}

impl From<&DeviceConfig> for DeviceSettings {
    fn from(config: &DeviceConfig) -> Self {
        Self {
            gamepad_index: config.gamepad_index,
            poll_timeout: Duration::from_millis(config.poll_timeout_ms),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Print every payload to stdout
    pub echo: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { echo: true }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AxesConfig {
    pub rudder: AxisProfile,
    pub winch: AxisProfile,
    pub ballast: AxisProfile,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            rudder: AxisProfile::rudder(),
            winch: AxisProfile::winch(),
            ballast: AxisProfile::ballast(),
        }
    }
}

impl AxesConfig {
    pub fn mapper(&self) -> Result<CommandMapper, MappingError> {
        CommandMapper::new(
            self.rudder.clone(),
            self.winch.clone(),
            self.ballast.clone(),
        )
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path`, or the default location when `None`.
    ///
    /// An explicit path has to exist; a missing default file yields defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_config_path() {
                Some(path) => (path, false),
                None => {
                    info!("No config directory available, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| ConfigError::ReadError {
                path: path.clone(),
                message: e.to_string(),
            })?;
        if !exists && !explicit {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ConfigError::ReadError {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.link.host.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "link.host is empty, pass the controller address".to_string(),
            ));
        }
        if self.link.port == Some(0) {
            return Err(ConfigError::Invalid("link.port must not be 0".to_string()));
        }
        if self.link.transport == Transport::Mqtt {
            if self.link.mqtt.topic.trim().is_empty() {
                return Err(ConfigError::Invalid("link.mqtt.topic is empty".to_string()));
            }
            if self.link.mqtt.client_id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "link.mqtt.client_id is empty".to_string(),
                ));
            }
        }
        if self.device.poll_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "device.poll_timeout_ms must be positive".to_string(),
            ));
        }
        self.axes.mapper()?;
        Ok(())
    }
}
