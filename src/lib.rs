//! sailpad reads a gamepad, turns the stick, trigger and button state into
//! manual sail, rudder and ballast commands and streams them to the boat's
//! controller, one JSON message per cycle.
//!
//! ```text
//! controller ──► mapping ──► link
//!  (gilrs)      (pure)      (websocket / mqtt)
//!        └──── streaming loop ────┘
//! ```

pub mod cli;
pub mod config;
pub mod controller;
pub mod link;
pub mod mapping;
pub mod streaming;
