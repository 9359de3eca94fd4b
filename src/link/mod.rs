//! # Controller link
//!
//! Outbound side of the bridge: the wire message and the transports that carry
//! it to the boat's controller.
//!
//! ```text
//! link/
//! ├── message.rs    - command message schema and encoder
//! ├── websocket.rs  - ws:// text frames (default transport)
//! └── mqtt.rs       - publish on a broker topic
//! ```
//!
//! The link is one-way and best-effort. Nothing is acknowledged, buffered or
//! retried; a failed send ends the stream.

pub mod message;
pub mod mqtt;
pub mod websocket;

use crate::config::{LinkConfig, Transport};
use std::time::Duration;

pub use message::{encode, CommandMessage};
pub use mqtt::{MqttSink, MqttSinkSettings};
pub use websocket::WebSocketSink;

/// Transmits one opaque text payload per call.
pub trait CommandSink {
    /// Sends `payload`, possibly blocking on backpressure. An error is final
    /// for the link.
    fn send(&mut self, payload: &str) -> Result<(), LinkError>;
}

// Link errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("Failed to connect: {0}")]
    ConnectionError(String),

    #[error("Failed to send: {0}")]
    SendError(String),

    #[error("Link closed: {0}")]
    Closed(String),
}

/// Opens the transport selected in the config.
pub fn open(config: &LinkConfig) -> Result<Box<dyn CommandSink>, LinkError> {
    match config.transport {
        Transport::WebSocket => Ok(Box::new(WebSocketSink::connect(
            &config.host,
            config.effective_port(),
            &config.path,
        )?)),
        Transport::Mqtt => {
            let settings = MqttSinkSettings {
                host: config.host.clone(),
                port: config.effective_port(),
                topic: config.mqtt.topic.clone(),
                client_id: config.mqtt.client_id.clone(),
                keep_alive: Duration::from_secs(config.mqtt.keep_alive_secs),
            };
            Ok(Box::new(MqttSink::connect(&settings)?))
        }
    }
}
