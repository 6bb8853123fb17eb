// Keyboard → simulation control mapping.

use std::collections::HashSet;

use doppler_core::params::ControlParams;
use doppler_core::{Control, ControlInput};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Key bindings, also shown in the help panel.
pub const BINDINGS: &[(&str, &str)] = &[
    ("Up / Down", "source frequency"),
    ("Left / Right", "source velocity"),
    ("A / D", "observer horizontal velocity"),
    ("W / S", "observer vertical velocity"),
    ("Z / X", "slower / faster time"),
    ("Esc", "quit"),
];

pub fn control_for_key(code: KeyCode) -> Option<Control> {
    let control = match code {
        KeyCode::ArrowUp => Control::FrequencyUp,
        KeyCode::ArrowDown => Control::FrequencyDown,
        KeyCode::ArrowRight => Control::SourcePushRight,
        KeyCode::ArrowLeft => Control::SourcePushLeft,
        KeyCode::KeyD => Control::ObserverPushRight,
        KeyCode::KeyA => Control::ObserverPushLeft,
        KeyCode::KeyW => Control::ObserverPushUp,
        KeyCode::KeyS => Control::ObserverPushDown,
        KeyCode::KeyZ => Control::TimeSlower,
        KeyCode::KeyX => Control::TimeFaster,
        _ => return None,
    };
    Some(control)
}

/// Controls currently held down. Each one is applied once per frame until
/// released.
#[derive(Debug, Default)]
pub struct HeldControls {
    held: HashSet<Control>,
}

impl HeldControls {
    /// Track a key transition. Returns `true` if the key is bound.
    pub fn handle_key(&mut self, code: KeyCode, state: ElementState) -> bool {
        let Some(control) = control_for_key(code) else {
            return false;
        };
        match state {
            ElementState::Pressed => self.held.insert(control),
            ElementState::Released => self.held.remove(&control),
        };
        true
    }

    /// Forget everything, e.g. when the window loses focus and release events
    /// will not arrive.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn input(&self, steps: &ControlParams) -> ControlInput {
        ControlInput::from_held(self.held.iter().copied(), steps)
    }
}
