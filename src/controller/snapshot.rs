//! Control state snapshot
//!
//! Holds one raw integer reading for every control of the gamepad. The set of
//! controls is closed, so the snapshot is a fixed array indexed by [`Control`]
//! and can never be missing a key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every logical control the snapshot carries.
///
/// The serde names are the canonical names used in config files and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    // Digital controls, 0 = released, 1 = pressed
    A,
    B,
    X,
    Y,
    Back,
    Start,
    Middle,
    Left,
    Right,
    Up,
    Down,
    #[serde(rename = "LB")]
    LeftBumper,
    #[serde(rename = "RB")]
    RightBumper,
    #[serde(rename = "LJ/Button")]
    LeftStickButton,
    #[serde(rename = "RJ/Button")]
    RightStickButton,

    // Stick components; Left/Up carry -128..=0, Right/Down carry 0..=127
    #[serde(rename = "LJ/Left")]
    LeftStickLeft,
    #[serde(rename = "LJ/Right")]
    LeftStickRight,
    #[serde(rename = "LJ/Up")]
    LeftStickUp,
    #[serde(rename = "LJ/Down")]
    LeftStickDown,
    #[serde(rename = "RJ/Left")]
    RightStickLeft,
    #[serde(rename = "RJ/Right")]
    RightStickRight,
    #[serde(rename = "RJ/Up")]
    RightStickUp,
    #[serde(rename = "RJ/Down")]
    RightStickDown,

    // Triggers, 0..=255
    #[serde(rename = "LT")]
    LeftTrigger,
    #[serde(rename = "RT")]
    RightTrigger,
}

impl Control {
    pub const COUNT: usize = 25;

    pub const ALL: [Control; Control::COUNT] = [
        Control::A,
        Control::B,
        Control::X,
        Control::Y,
        Control::Back,
        Control::Start,
        Control::Middle,
        Control::Left,
        Control::Right,
        Control::Up,
        Control::Down,
        Control::LeftBumper,
        Control::RightBumper,
        Control::LeftStickButton,
        Control::RightStickButton,
        Control::LeftStickLeft,
        Control::LeftStickRight,
        Control::LeftStickUp,
        Control::LeftStickDown,
        Control::RightStickLeft,
        Control::RightStickRight,
        Control::RightStickUp,
        Control::RightStickDown,
        Control::LeftTrigger,
        Control::RightTrigger,
    ];

    /// Canonical name, e.g. `"RJ/Left"` or `"RB"`.
    pub fn name(self) -> &'static str {
        match self {
            Control::A => "A",
            Control::B => "B",
            Control::X => "X",
            Control::Y => "Y",
            Control::Back => "Back",
            Control::Start => "Start",
            Control::Middle => "Middle",
            Control::Left => "Left",
            Control::Right => "Right",
            Control::Up => "Up",
            Control::Down => "Down",
            Control::LeftBumper => "LB",
            Control::RightBumper => "RB",
            Control::LeftStickButton => "LJ/Button",
            Control::RightStickButton => "RJ/Button",
            Control::LeftStickLeft => "LJ/Left",
            Control::LeftStickRight => "LJ/Right",
            Control::LeftStickUp => "LJ/Up",
            Control::LeftStickDown => "LJ/Down",
            Control::RightStickLeft => "RJ/Left",
            Control::RightStickRight => "RJ/Right",
            Control::RightStickUp => "RJ/Up",
            Control::RightStickDown => "RJ/Down",
            Control::LeftTrigger => "LT",
            Control::RightTrigger => "RT",
        }
    }

    /// Buttons report 0 or 1, everything else is analog.
    pub fn is_digital(self) -> bool {
        (self as usize) <= Control::RightStickButton as usize
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw readings for all controls, refreshed once per streaming cycle.
///
/// The device layer writes it through `&mut` during the refresh, the transform
/// only ever reads it through `&`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlSnapshot {
    readings: [i32; Control::COUNT],
}

impl Default for ControlSnapshot {
    fn default() -> Self {
        Self {
            readings: [0; Control::COUNT],
        }
    }
}

impl ControlSnapshot {
    pub fn get(&self, control: Control) -> i32 {
        self.readings[control.index()]
    }

    pub fn set(&mut self, control: Control, value: i32) {
        self.readings[control.index()] = value;
    }

    pub fn set_pressed(&mut self, control: Control, pressed: bool) {
        self.set(control, i32::from(pressed));
    }

    pub fn is_pressed(&self, control: Control) -> bool {
        self.get(control) != 0
    }

    /// Builder-style setter, mostly useful for assembling fixtures.
    pub fn with(mut self, control: Control, value: i32) -> Self {
        self.set(control, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Control, i32)> + '_ {
        Control::ALL
            .iter()
            .map(move |control| (*control, self.get(*control)))
    }
}

// Only non-zero readings, keeps per-cycle debug lines short
impl fmt::Display for ControlSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (control, value) in self.iter().filter(|(_, value)| *value != 0) {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", control, value)?;
            first = false;
        }
        if first {
            f.write_str("<idle>")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_is_the_serde_name() {
        for control in Control::ALL {
            let serialized = serde_json::to_string(&control).unwrap();
            assert_eq!(serialized, format!("\"{}\"", control));
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!(serde_json::from_str::<Control>("\"Byte0\"").is_err());
    }

    #[test]
    fn test_digital_family() {
        assert!(Control::A.is_digital());
        assert!(Control::RightStickButton.is_digital());
        assert!(!Control::LeftStickLeft.is_digital());
        assert!(!Control::RightTrigger.is_digital());
        assert_eq!(Control::ALL.iter().filter(|c| c.is_digital()).count(), 15);
    }

    #[test]
    fn test_default_snapshot_is_all_zero() {
        let snapshot = ControlSnapshot::default();
        assert_eq!(snapshot.iter().count(), Control::COUNT);
        assert!(snapshot.iter().all(|(_, value)| value == 0));
        assert_eq!(snapshot.to_string(), "<idle>");
    }

    #[test]
    fn test_set_and_display() {
        let mut snapshot = ControlSnapshot::default().with(Control::RightStickLeft, -40);
        snapshot.set_pressed(Control::A, true);
        assert!(snapshot.is_pressed(Control::A));
        assert_eq!(snapshot.get(Control::RightStickLeft), -40);
        assert_eq!(snapshot.to_string(), "A=1 RJ/Left=-40");
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let name = serde_json::to_string(&Control::RightStickLeft).unwrap();
        assert_eq!(name, "\"RJ/Left\"");
        let parsed: Control = serde_json::from_str("\"RB\"").unwrap();
        assert_eq!(parsed, Control::RightBumper);
    }
}
