//! Operating mode selection from the face buttons
//!
//! Resolved fresh every cycle from the current button state, there is no
//! memory of the previous mode.

use crate::controller::{Control, ControlSnapshot};
use serde::{Serialize, Serializer};
use std::fmt;

/// Operating mode of an actuated subsystem, serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlMode {
    Auto = 1,
    WiFi = 2,
    Disabled = 3,
    FilteredRc = 4,
}

impl ControlMode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlMode::Auto => "Auto",
            ControlMode::WiFi => "WiFi",
            ControlMode::Disabled => "Disabled",
            ControlMode::FilteredRc => "Filtered RC",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

impl Serialize for ControlMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// What the buttons ask for this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSelection {
    /// Same mode for rudder, winch and ballast
    All(ControlMode),
    /// Rudder and winch only, ballast keeps whatever the controller has
    RudderWinch {
        rudder: ControlMode,
        winch: ControlMode,
    },
}

impl fmt::Display for ModeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeSelection::All(mode) => write!(f, "all {}", mode),
            ModeSelection::RudderWinch { rudder, winch } => {
                write!(f, "rudder {}, winch {}", rudder, winch)
            }
        }
    }
}

// Checked in order, first pressed button wins
const MODE_BUTTONS: [(Control, ControlMode); 4] = [
    (Control::Y, ControlMode::WiFi),
    (Control::B, ControlMode::FilteredRc),
    (Control::A, ControlMode::Auto),
    (Control::X, ControlMode::Disabled),
];

pub fn resolve_mode(snapshot: &ControlSnapshot) -> Option<ModeSelection> {
    if let Some((_, mode)) = MODE_BUTTONS
        .iter()
        .find(|(button, _)| snapshot.is_pressed(*button))
    {
        return Some(ModeSelection::All(*mode));
    }

    if snapshot.is_pressed(Control::RightBumper) {
        return Some(ModeSelection::RudderWinch {
            rudder: ControlMode::WiFi,
            winch: ControlMode::Auto,
        });
    }

    None
}
