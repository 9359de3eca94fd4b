//! Transforms a control snapshot into manual boat commands.
//!
//! Two independent paths feed the command for each cycle:
//!
//! ```text
//! ControlSnapshot ──► conditioner (rudder, winch, ballast) ──┐
//!        │                                                   ├──► ManualCommand
//!        └─────────► mode resolver (Y, B, A, X, RB) ─────────┘
//! ```
//!
//! Both paths are pure; nothing carries over from one cycle to the next.

pub mod command;
pub mod conditioner;
pub mod error;
pub mod mode;

pub use command::{CommandMapper, ManualCommand};
pub use conditioner::{AxisProfile, Pairing};
pub use error::MappingError;
pub use mode::{resolve_mode, ControlMode, ModeSelection};
