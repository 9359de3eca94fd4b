use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use statum::{machine, state};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::snapshot::{Control, ControlSnapshot};
use super::{DeviceError, StateSource};

// Device settings
#[derive(Clone, Debug)]
pub struct DeviceSettings {
    // Index into the connected gamepads, first one when unset
    pub gamepad_index: Option<usize>,
    // Upper bound for one blocking wait on gilrs
    pub poll_timeout: Duration,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            gamepad_index: None,
            poll_timeout: Duration::from_millis(20),
        }
    }
}

// Gamepad source states
#[state]
#[derive(Debug, Clone)]
pub enum DeviceState {
    Initializing,
    Polling,
}

#[machine]
pub struct GamepadSource<S: DeviceState> {
    // Gilrs context
    gilrs: Gilrs,

    // Pad whose state ends up in the snapshot
    active_gamepad: Option<GamepadId>,

    settings: DeviceSettings,
}

impl GamepadSource<Initializing> {
    pub fn create(settings: Option<DeviceSettings>) -> Result<Self, DeviceError> {
        let settings = settings.unwrap_or_default();
        debug!("Creating gamepad source with settings: {:?}", settings);

        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(DeviceError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::new(gilrs, None, settings))
    }

    // Pick the active gamepad and start polling
    pub fn initialize(mut self) -> Result<GamepadSource<Polling>, DeviceError> {
        let index = self.settings.gamepad_index.unwrap_or(0);

        let (id, name) = {
            let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();

            if gamepads.is_empty() {
                error!("No gamepad connected");
                return Err(DeviceError::NoGamepad);
            }

            info!("Found {} gamepads:", gamepads.len());
            for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
                info!(
                    "  [{}] ID: {}, Name: {}, UUID: {:?}",
                    idx,
                    id,
                    gamepad.name(),
                    gamepad.uuid()
                );
            }

            match gamepads.get(index) {
                Some((id, gamepad)) => (*id, gamepad.name().to_string()),
                None => {
                    return Err(DeviceError::GamepadIndexOutOfRange {
                        index,
                        available: gamepads.len(),
                    })
                }
            }
        };

        self.active_gamepad = Some(id);
        info!("Selected gamepad: {} ({})", name, id);
        Ok(self.transition())
    }
}

impl GamepadSource<Polling> {
    fn active_id(&self) -> Result<GamepadId, DeviceError> {
        self.active_gamepad.ok_or(DeviceError::NoGamepad)
    }

    // Only disconnects matter; gilrs keeps the per-pad state itself
    fn handle_event(&self, active: GamepadId, event: Event) -> Result<(), DeviceError> {
        if event.id != active {
            debug!("Skipping event from non-active gamepad: {:?}", event.id);
            return Ok(());
        }
        match event.event {
            EventType::Disconnected => {
                warn!("Active gamepad {} disconnected", active);
                Err(DeviceError::Disconnected(active.to_string()))
            }
            other => {
                debug!("Gamepad event: {:?}", other);
                Ok(())
            }
        }
    }

    fn write_snapshot(&self, active: GamepadId, snapshot: &mut ControlSnapshot) {
        let gamepad = self.gilrs.gamepad(active);

        for (button, control) in BUTTON_MAP {
            snapshot.set_pressed(control, gamepad.is_pressed(button));
        }

        let (left, right) = stick_extents(gamepad.value(Axis::LeftStickX));
        snapshot.set(Control::LeftStickLeft, left);
        snapshot.set(Control::LeftStickRight, right);
        // gilrs reports up as positive, the device convention puts up on the negative extent
        let (up, down) = stick_extents(-gamepad.value(Axis::LeftStickY));
        snapshot.set(Control::LeftStickUp, up);
        snapshot.set(Control::LeftStickDown, down);

        let (left, right) = stick_extents(gamepad.value(Axis::RightStickX));
        snapshot.set(Control::RightStickLeft, left);
        snapshot.set(Control::RightStickRight, right);
        let (up, down) = stick_extents(-gamepad.value(Axis::RightStickY));
        snapshot.set(Control::RightStickUp, up);
        snapshot.set(Control::RightStickDown, down);

        let left_trigger = gamepad
            .button_data(Button::LeftTrigger2)
            .map(|data| data.value())
            .unwrap_or(0.0)
            .max(gamepad.value(Axis::LeftZ));
        let right_trigger = gamepad
            .button_data(Button::RightTrigger2)
            .map(|data| data.value())
            .unwrap_or(0.0)
            .max(gamepad.value(Axis::RightZ));
        snapshot.set(Control::LeftTrigger, trigger_reading(left_trigger));
        snapshot.set(Control::RightTrigger, trigger_reading(right_trigger));
    }
}

impl StateSource for GamepadSource<Polling> {
    /// Blocks until gilrs has at least one event or the poll timeout runs out,
    /// drains whatever else is queued, then copies the pad state.
    fn refresh(&mut self, snapshot: &mut ControlSnapshot) -> Result<(), DeviceError> {
        let active = self.active_id()?;

        if let Some(event) = self
            .gilrs
            .next_event_blocking(Some(self.settings.poll_timeout))
        {
            self.handle_event(active, event)?;
            while let Some(event) = self.gilrs.next_event() {
                self.handle_event(active, event)?;
            }
        }

        if !self.gilrs.gamepad(active).is_connected() {
            return Err(DeviceError::Disconnected(active.to_string()));
        }

        self.write_snapshot(active, snapshot);
        Ok(())
    }
}

// gilrs button -> snapshot control, XInput layout
const BUTTON_MAP: [(Button, Control); 15] = [
    (Button::South, Control::A),
    (Button::East, Control::B),
    (Button::West, Control::X),
    (Button::North, Control::Y),
    (Button::Select, Control::Back),
    (Button::Start, Control::Start),
    (Button::Mode, Control::Middle),
    (Button::DPadLeft, Control::Left),
    (Button::DPadRight, Control::Right),
    (Button::DPadUp, Control::Up),
    (Button::DPadDown, Control::Down),
    (Button::LeftTrigger, Control::LeftBumper),
    (Button::RightTrigger, Control::RightBumper),
    (Button::LeftThumb, Control::LeftStickButton),
    (Button::RightThumb, Control::RightStickButton),
];

/// Splits a normalized axis value into the (negative, positive) raw components.
///
/// Negative extent covers -128..=0, positive extent 0..=127, matching the
/// decoded two's-complement byte the pad reports.
pub fn stick_extents(value: f32) -> (i32, i32) {
    let value = value.clamp(-1.0, 1.0);
    if value < 0.0 {
        ((value * 128.0).round() as i32, 0)
    } else {
        (0, (value * 127.0).round() as i32)
    }
}

pub fn trigger_reading(value: f32) -> i32 {
    (value.clamp(0.0, 1.0) * 255.0).round() as i32
}
