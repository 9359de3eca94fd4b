//! Wire format of the manual command message
//!
//! ```text
//! {"manual_sail_cmd":{"voltage":f},"manual_rudder_cmd":{"pos":f},"manual_ballast_cmd":{"vel":f}
//!  [,"control_mode":{"rudder_mode":i,"winch_mode":i[,"ballast_mode":i]}]}
//! ```
//!
//! The controller looks fields up by name; the field order here still follows
//! the historical payload.

use crate::mapping::{ControlMode, ManualCommand, ModeSelection};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SailCommand {
    pub voltage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RudderCommand {
    pub pos: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BallastCommand {
    pub vel: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlModeBlock {
    pub rudder_mode: ControlMode,
    pub winch_mode: ControlMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ballast_mode: Option<ControlMode>,
}

impl From<ModeSelection> for ControlModeBlock {
    fn from(selection: ModeSelection) -> Self {
        match selection {
            ModeSelection::All(mode) => Self {
                rudder_mode: mode,
                winch_mode: mode,
                ballast_mode: Some(mode),
            },
            ModeSelection::RudderWinch { rudder, winch } => Self {
                rudder_mode: rudder,
                winch_mode: winch,
                ballast_mode: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommandMessage {
    pub manual_sail_cmd: SailCommand,
    pub manual_rudder_cmd: RudderCommand,
    pub manual_ballast_cmd: BallastCommand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_mode: Option<ControlModeBlock>,
}

impl From<&ManualCommand> for CommandMessage {
    fn from(command: &ManualCommand) -> Self {
        Self {
            manual_sail_cmd: SailCommand {
                voltage: to_wire_precision(command.winch),
            },
            manual_rudder_cmd: RudderCommand {
                pos: to_wire_precision(command.rudder),
            },
            manual_ballast_cmd: BallastCommand {
                vel: to_wire_precision(command.ballast),
            },
            control_mode: command.mode.map(ControlModeBlock::from),
        }
    }
}

impl CommandMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Six decimal places, the precision the controller has always received.
pub fn to_wire_precision(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

pub fn encode(command: &ManualCommand) -> Result<String, serde_json::Error> {
    CommandMessage::from(command).encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn command(mode: Option<ModeSelection>) -> ManualCommand {
        ManualCommand {
            winch: 1.5,
            rudder: -0.25,
            ballast: 45.0,
            mode,
        }
    }

    #[test]
    fn test_no_mode_block() {
        let payload = encode(&command(None)).unwrap();
        assert_eq!(
            payload,
            r#"{"manual_sail_cmd":{"voltage":1.5},"manual_rudder_cmd":{"pos":-0.25},"manual_ballast_cmd":{"vel":45.0}}"#
        );
    }

    #[test]
    fn test_full_mode_block() {
        let payload = encode(&command(Some(ModeSelection::All(ControlMode::Disabled)))).unwrap();
        let value: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["control_mode"]["rudder_mode"], 3);
        assert_eq!(value["control_mode"]["winch_mode"], 3);
        assert_eq!(value["control_mode"]["ballast_mode"], 3);
    }

    #[test]
    fn test_partial_mode_block_omits_ballast() {
        let payload = encode(&command(Some(ModeSelection::RudderWinch {
            rudder: ControlMode::WiFi,
            winch: ControlMode::Auto,
        })))
        .unwrap();
        assert!(payload.ends_with(r#""control_mode":{"rudder_mode":2,"winch_mode":1}}"#));
        let value: Value = serde_json::from_str(&payload).unwrap();
        assert!(value["control_mode"].get("ballast_mode").is_none());
    }

    #[test]
    fn test_field_order() {
        let payload = encode(&command(Some(ModeSelection::All(ControlMode::Auto)))).unwrap();
        let positions: Vec<usize> = [
            "manual_sail_cmd",
            "manual_rudder_cmd",
            "manual_ballast_cmd",
            "control_mode",
            "rudder_mode",
            "winch_mode",
            "ballast_mode",
        ]
        .iter()
        .map(|key| payload.find(key).unwrap())
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_wire_precision() {
        assert_eq!(to_wire_precision(0.1234564), 0.123456);
        assert_eq!(to_wire_precision(-0.4953271028037383), -0.495327);
        assert_eq!(to_wire_precision(6.0), 6.0);
        assert_eq!(to_wire_precision(-0.0).to_bits(), (-0.0_f64).to_bits());
    }
}
