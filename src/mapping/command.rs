//! Snapshot → manual command transform

use crate::controller::ControlSnapshot;
use crate::mapping::conditioner::AxisProfile;
use crate::mapping::mode::{resolve_mode, ModeSelection};
use crate::mapping::MappingError;
use tracing::debug;

/// Everything one cycle sends to the boat, before encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualCommand {
    /// Sail winch voltage
    pub winch: f64,
    /// Rudder position
    pub rudder: f64,
    /// Ballast velocity
    pub ballast: f64,
    pub mode: Option<ModeSelection>,
}

/// Applies the three axis profiles and the mode resolver to a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMapper {
    rudder: AxisProfile,
    winch: AxisProfile,
    ballast: AxisProfile,
}

impl Default for CommandMapper {
    fn default() -> Self {
        Self {
            rudder: AxisProfile::rudder(),
            winch: AxisProfile::winch(),
            ballast: AxisProfile::ballast(),
        }
    }
}

impl CommandMapper {
    pub fn new(
        rudder: AxisProfile,
        winch: AxisProfile,
        ballast: AxisProfile,
    ) -> Result<Self, MappingError> {
        rudder.validate("rudder")?;
        winch.validate("winch")?;
        ballast.validate("ballast")?;

        let axes = [("rudder", &rudder), ("winch", &winch), ("ballast", &ballast)];
        for (i, (name, profile)) in axes.iter().enumerate() {
            for (other_name, other) in axes.iter().skip(i + 1) {
                let shared = [profile.negative, profile.positive]
                    .into_iter()
                    .find(|c| *c == other.negative || *c == other.positive);
                if let Some(control) = shared {
                    return Err(MappingError::ConflictingBinding(format!(
                        "{} is used by both {} and {}",
                        control, name, other_name
                    )));
                }
            }
        }

        Ok(Self {
            rudder,
            winch,
            ballast,
        })
    }

    pub fn map(&self, snapshot: &ControlSnapshot) -> ManualCommand {
        let command = ManualCommand {
            winch: self.winch.condition(snapshot),
            rudder: self.rudder.condition(snapshot),
            ballast: self.ballast.condition(snapshot),
            mode: resolve_mode(snapshot),
        };
        debug!("Mapped {} -> {:?}", snapshot, command);
        command
    }
}
