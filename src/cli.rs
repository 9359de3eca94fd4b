use crate::config::{Config, Transport};
use clap::Parser;
use std::path::PathBuf;

/// Streams gamepad commands to the boat's controller.
#[derive(Debug, Clone, Parser)]
#[command(name = "sailpad", version, about)]
pub struct Cli {
    /// Controller address (host name or IP)
    pub host: Option<String>,

    /// Controller port, 13000 for websocket and 1883 for mqtt by default
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Transport carrying the payloads
    #[arg(short, long, value_enum)]
    pub transport: Option<Transport>,

    /// Config file, defaults to ~/.config/sailpad/config.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not print payloads to stdout
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Command line values win over the config file.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.link.host = host.clone();
        }
        if let Some(port) = self.port {
            config.link.port = Some(port);
        }
        if let Some(transport) = self.transport {
            config.link.transport = transport;
        }
        if self.quiet {
            config.display.echo = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_only() {
        let cli = Cli::try_parse_from(["sailpad", "192.168.1.50"]).unwrap();
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.link.host, "192.168.1.50");
        assert_eq!(config.link.effective_port(), 13000);
        assert_eq!(config.link.transport, Transport::WebSocket);
        assert!(config.display.echo);
    }

    #[test]
    fn test_flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "sailpad",
            "broker",
            "--transport",
            "mqtt",
            "--port",
            "1884",
            "--quiet",
        ])
        .unwrap();
        let mut config = Config::default();
        config.link.host = "from-file".to_string();
        cli.apply(&mut config);
        assert_eq!(config.link.host, "broker");
        assert_eq!(config.link.transport, Transport::Mqtt);
        assert_eq!(config.link.effective_port(), 1884);
        assert!(!config.display.echo);
    }

    #[test]
    fn test_missing_host_keeps_file_value() {
        let cli = Cli::try_parse_from(["sailpad", "-c", "/tmp/boat.toml"]).unwrap();
        let mut config = Config::default();
        config.link.host = "from-file".to_string();
        cli.apply(&mut config);
        assert_eq!(config.link.host, "from-file");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/boat.toml")));
    }

    #[test]
    fn test_unknown_transport_is_rejected() {
        assert!(Cli::try_parse_from(["sailpad", "boat", "-t", "serial"]).is_err());
    }
}
