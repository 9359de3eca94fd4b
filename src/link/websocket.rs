use std::net::TcpStream;
use tracing::{debug, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::{CommandSink, LinkError};

/// One text frame per payload over a plain `ws://` connection.
pub struct WebSocketSink {
    url: String,
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl WebSocketSink {
    pub fn connect(host: &str, port: u16, path: &str) -> Result<Self, LinkError> {
        let url = websocket_url(host, port, path);
        info!("Connecting to controller at {}", url);

        let (socket, response) = tungstenite::connect(url.as_str())
            .map_err(|e| LinkError::ConnectionError(format!("{}: {}", url, e)))?;
        info!(
            "WebSocket connected to {} (HTTP {})",
            url,
            response.status()
        );

        Ok(Self { url, socket })
    }
}

impl CommandSink for WebSocketSink {
    fn send(&mut self, payload: &str) -> Result<(), LinkError> {
        self.socket
            .send(Message::text(payload.to_owned()))
            .map_err(|e| LinkError::SendError(format!("{}: {}", self.url, e)))?;
        debug!("Sent {} bytes to {}", payload.len(), self.url);
        Ok(())
    }
}

impl Drop for WebSocketSink {
    fn drop(&mut self) {
        if let Err(e) = self.socket.close(None) {
            debug!("Closing WebSocket to {} failed: {}", self.url, e);
            return;
        }
        // Push the close frame out, the peer's reply is not awaited
        if let Err(e) = self.socket.flush() {
            warn!("Could not flush close frame to {}: {}", self.url, e);
        }
    }
}

pub fn websocket_url(host: &str, port: u16, path: &str) -> String {
    if path.starts_with('/') {
        format!("ws://{}:{}{}", host, port, path)
    } else {
        format!("ws://{}:{}/{}", host, port, path)
    }
}
