//! Signal conditioning for paired analog readings
//!
//! Every actuated axis is driven by two opposite-direction readings. They are
//! combined into one signed raw magnitude, the deadband is subtracted, and the
//! result is scaled into the command's physical range:
//!
//! ```text
//! value = polarity * ((combined - radius * sign(combined)) * gain) / (span - radius)
//! ```
//!
//! Multiplying by the gain before dividing keeps the results bit-identical to
//! the historical per-axis formulas (`-c * 6 / 127`, `(RT - LT) * 90 / 255`,
//! `-c / 107 * 0.5`).

use crate::controller::{Control, ControlSnapshot};
use crate::mapping::MappingError;
use serde::{Deserialize, Serialize};

/// Stick components may carry a decoded negative byte, so they clamp symmetrically.
pub const STICK_READING_MIN: i32 = -255;
pub const STICK_READING_MAX: i32 = 255;
pub const TRIGGER_READING_MIN: i32 = 0;
pub const TRIGGER_READING_MAX: i32 = 255;

/// Sign with `sign(0) == 0`, unlike `f64::signum`.
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub fn combine(negative: i32, positive: i32) -> i32 {
    negative + positive
}

/// Pulls the value towards zero by `radius`. Inside the band the subtraction
/// overshoots through zero; this matches the controller's expectations.
pub fn remove_deadband(combined: f64, radius: f64) -> f64 {
    combined - radius * sign(combined)
}

/// How the two readings of an axis relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pairing {
    /// Stick components: the negative extent already carries its sign.
    Summed,
    /// Trigger pair: both read 0..=255, the negative one is subtracted.
    Differential,
}

/// Parameters of one conditioned axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisProfile {
    pub negative: Control,
    pub positive: Control,
    pub pairing: Pairing,
    pub deadband_radius: f64,
    /// Raw full-scale magnitude the deadband is taken out of
    pub span: f64,
    pub gain: f64,
    pub invert: bool,
}

impl AxisProfile {
    /// Right stick horizontal, 20 count deadband, roughly -0.5..=0.5.
    pub fn rudder() -> Self {
        Self {
            negative: Control::RightStickLeft,
            positive: Control::RightStickRight,
            pairing: Pairing::Summed,
            deadband_radius: 20.0,
            span: 127.0,
            gain: 0.5,
            invert: true,
        }
    }

    /// Left stick horizontal, no deadband, -6..=6 volts.
    pub fn winch() -> Self {
        Self {
            negative: Control::LeftStickLeft,
            positive: Control::LeftStickRight,
            pairing: Pairing::Summed,
            deadband_radius: 0.0,
            span: 127.0,
            gain: 6.0,
            invert: true,
        }
    }

    /// RT minus LT, no deadband, -90..=90.
    pub fn ballast() -> Self {
        Self {
            negative: Control::LeftTrigger,
            positive: Control::RightTrigger,
            pairing: Pairing::Differential,
            deadband_radius: 0.0,
            span: 255.0,
            gain: 90.0,
            invert: false,
        }
    }

    pub fn validate(&self, axis: &str) -> Result<(), MappingError> {
        if !self.deadband_radius.is_finite() || self.deadband_radius < 0.0 {
            return Err(MappingError::ConfigError(format!(
                "{}: deadband radius must be a non-negative number, got {}",
                axis, self.deadband_radius
            )));
        }
        if !self.span.is_finite() || self.span - self.deadband_radius <= 0.0 {
            return Err(MappingError::ConfigError(format!(
                "{}: span {} must exceed the deadband radius {}",
                axis, self.span, self.deadband_radius
            )));
        }
        if !self.gain.is_finite() {
            return Err(MappingError::ConfigError(format!(
                "{}: gain must be finite, got {}",
                axis, self.gain
            )));
        }
        if self.negative == self.positive {
            return Err(MappingError::ConfigError(format!(
                "{}: negative and positive extent both read {}",
                axis, self.negative
            )));
        }
        if self.negative.is_digital() || self.positive.is_digital() {
            return Err(MappingError::ConfigError(format!(
                "{}: {} / {} must both be analog controls",
                axis, self.negative, self.positive
            )));
        }
        Ok(())
    }

    /// Signed raw magnitude from the snapshot, after clamping each reading.
    pub fn combined(&self, snapshot: &ControlSnapshot) -> i32 {
        let negative = snapshot.get(self.negative);
        let positive = snapshot.get(self.positive);
        match self.pairing {
            Pairing::Summed => combine(
                negative.clamp(STICK_READING_MIN, STICK_READING_MAX),
                positive.clamp(STICK_READING_MIN, STICK_READING_MAX),
            ),
            Pairing::Differential => combine(
                -negative.clamp(TRIGGER_READING_MIN, TRIGGER_READING_MAX),
                positive.clamp(TRIGGER_READING_MIN, TRIGGER_READING_MAX),
            ),
        }
    }

    /// Deadband removal and scaling of an already combined magnitude.
    ///
    /// Without a deadband the magnitude stays integral through the inversion,
    /// so a centred axis scales to `+0.0`. With one, the adjusted value is
    /// already fractional and a centred inverted axis gives `-0.0`.
    pub fn scale(&self, combined: i32) -> f64 {
        let oriented = if self.deadband_radius == 0.0 {
            let raw = if self.invert { -combined } else { combined };
            raw as f64
        } else {
            let adjusted = remove_deadband(combined as f64, self.deadband_radius);
            if self.invert {
                -adjusted
            } else {
                adjusted
            }
        };
        oriented * self.gain / (self.span - self.deadband_radius)
    }

    pub fn condition(&self, snapshot: &ControlSnapshot) -> f64 {
        self.scale(self.combined(snapshot))
    }
}
