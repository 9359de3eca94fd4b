use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{CommandSink, LinkError};

#[derive(Debug, Clone, PartialEq)]
pub struct MqttSinkSettings {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub client_id: String,
    pub keep_alive: Duration,
}

/// Publishes every payload on one topic, fire and forget.
///
/// rumqttc needs its event loop polled for anything to leave the socket, so
/// a detached background thread drives the connection. The first connection error
/// marks the sink closed and the next `send` fails.
pub struct MqttSink {
    client: Client,
    topic: String,
    closed: Arc<AtomicBool>,
}

impl MqttSink {
    pub fn connect(settings: &MqttSinkSettings) -> Result<Self, LinkError> {
        info!(
            "Connecting to MQTT broker {}:{} as {}",
            settings.host, settings.port, settings.client_id
        );
        let mut mqtt_options = MqttOptions::new(
            settings.client_id.clone(),
            settings.host.clone(),
            settings.port,
        );
        mqtt_options.set_keep_alive(settings.keep_alive);

        let (client, mut connection) = Client::new(mqtt_options, 100);
        let closed = Arc::new(AtomicBool::new(false));

        let thread_closed = closed.clone();
        std::thread::Builder::new()
            .name("mqtt-connection".to_string())
            .spawn(move || {
                for notification in connection.iter() {
                    match notification {
                        Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                            info!("MQTT broker accepted connection: {:?}", ack.code)
                        }
                        Ok(event) => debug!("MQTT event: {:?}", event),
                        Err(e) => {
                            error!("MQTT connection failed: {}", e);
                            break;
                        }
                    }
                }
                thread_closed.store(true, Ordering::SeqCst);
            })
            .map_err(|e| LinkError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            topic: settings.topic.clone(),
            closed,
        })
    }
}

impl CommandSink for MqttSink {
    fn send(&mut self, payload: &str) -> Result<(), LinkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(LinkError::Closed(format!(
                "MQTT connection for topic {} is down",
                self.topic
            )));
        }
        self.client
            .publish(self.topic.as_str(), QoS::AtMostOnce, false, payload.as_bytes())
            .map_err(|e| LinkError::SendError(e.to_string()))?;
        debug!("Queued {} bytes on {}", payload.len(), self.topic);
        Ok(())
    }
}

impl Drop for MqttSink {
    fn drop(&mut self) {
        if let Err(e) = self.client.disconnect() {
            debug!("MQTT disconnect failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Instant;

    fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_dead_broker_closes_sink() {
        let settings = MqttSinkSettings {
            host: "127.0.0.1".to_string(),
            port: unused_port(),
            topic: "sailbot/test".to_string(),
            client_id: "sailpad-test".to_string(),
            keep_alive: Duration::from_secs(5),
        };
        let mut sink = MqttSink::connect(&settings).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let closed = loop {
            match sink.send(r#"{"a":1}"#) {
                Err(LinkError::Closed(message)) => break Some(message),
                // Raced the connection thread, the flag is set on the next try
                Err(LinkError::SendError(_)) | Ok(()) => {}
                Err(other) => panic!("unexpected error: {}", other),
            }
            if Instant::now() > deadline {
                break None;
            }
            std::thread::sleep(Duration::from_millis(20));
        };

        let message = closed.expect("sink never reported the dead broker");
        assert!(message.contains("sailbot/test"));
    }
}
