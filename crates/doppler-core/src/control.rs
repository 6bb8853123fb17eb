use glam::Vec2;

use crate::params::ControlParams;

/// A held control. Each one contributes a fixed delta per tick.
///
/// Directions are in screen space: +x is right, +y is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    FrequencyUp,
    FrequencyDown,
    SourcePushRight,
    SourcePushLeft,
    ObserverPushRight,
    ObserverPushLeft,
    ObserverPushUp,
    ObserverPushDown,
    TimeSlower,
    TimeFaster,
}

/// Deltas accumulated from input for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    pub frequency_delta: f32,
    pub source_velocity_delta: Vec2,
    pub observer_velocity_delta: Vec2,
    pub time_scale_delta: f32,
}

impl ControlInput {
    /// Sum the deltas of every held control.
    pub fn from_held(held: impl IntoIterator<Item = Control>, steps: &ControlParams) -> Self {
        let mut input = Self::default();
        for control in held {
            input.apply(control, steps);
        }
        input
    }

    pub fn apply(&mut self, control: Control, steps: &ControlParams) {
        let v = steps.velocity_step;
        match control {
            Control::FrequencyUp => self.frequency_delta += steps.frequency_step,
            Control::FrequencyDown => self.frequency_delta -= steps.frequency_step,
            Control::SourcePushRight => self.source_velocity_delta.x += v,
            Control::SourcePushLeft => self.source_velocity_delta.x -= v,
            Control::ObserverPushRight => self.observer_velocity_delta.x += v,
            Control::ObserverPushLeft => self.observer_velocity_delta.x -= v,
            Control::ObserverPushUp => self.observer_velocity_delta.y -= v,
            Control::ObserverPushDown => self.observer_velocity_delta.y += v,
            Control::TimeSlower => self.time_scale_delta -= steps.time_scale_step,
            Control::TimeFaster => self.time_scale_delta += steps.time_scale_step,
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_controls_sum_their_steps() {
        let steps = ControlParams::default();
        let input = ControlInput::from_held(
            [Control::FrequencyUp, Control::SourcePushRight, Control::ObserverPushUp],
            &steps,
        );
        assert_eq!(input.frequency_delta, 1.0);
        assert_eq!(input.source_velocity_delta, Vec2::new(34.0, 0.0));
        assert_eq!(input.observer_velocity_delta, Vec2::new(0.0, -34.0));
        assert_eq!(input.time_scale_delta, 0.0);
    }

    #[test]
    fn test_opposite_controls_cancel() {
        let steps = ControlParams::default();
        let input = ControlInput::from_held(
            [
                Control::TimeFaster,
                Control::TimeSlower,
                Control::ObserverPushLeft,
                Control::ObserverPushRight,
            ],
            &steps,
        );
        assert!(input.is_idle(), "{input:?}");
    }
}
