//! Gamepad side of the bridge
//!
//! 1. [`snapshot`] - the closed set of controls and their raw readings
//! 2. [`gamepad`] - gilrs-backed source that refreshes a snapshot
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► GamepadSource::refresh ──► ControlSnapshot ──► mapping
//!             (blocks on gilrs)          (read-only after refresh)
//! ```
//!
//! The streaming loop owns the snapshot and lends it mutably to the source
//! only for the duration of [`StateSource::refresh`].

pub mod gamepad;
pub mod snapshot;

pub use gamepad::{DeviceSettings, GamepadSource};
pub use snapshot::{Control, ControlSnapshot};

/// Anything that can bring a [`ControlSnapshot`] up to date.
pub trait StateSource {
    /// Refreshes every reading in `snapshot`. May block until new input is
    /// available; this is the loop's first suspension point.
    fn refresh(&mut self, snapshot: &mut ControlSnapshot) -> Result<(), DeviceError>;
}

// Device errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to initialize gamepad interface: {0}")]
    InitializationError(String),

    #[error("No gamepad connected")]
    NoGamepad,

    #[error("Gamepad index {index} out of range, {available} connected")]
    GamepadIndexOutOfRange { index: usize, available: usize },

    #[error("Gamepad disconnected: {0}")]
    Disconnected(String),
}
