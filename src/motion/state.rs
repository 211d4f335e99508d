//! Motion phases and speed modes.

use serde::Deserialize;

/// Current phase of a stepper's motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperState {
    /// No move in progress; `update()` emits nothing.
    #[default]
    Stopped,
    /// Ramping up toward the target speed.
    Accelerating,
    /// Cruising at the target speed.
    Running,
    /// Ramping down toward rest.
    Braking,
}

impl StepperState {
    /// State name for display/debugging.
    pub fn name(self) -> &'static str {
        match self {
            StepperState::Stopped => "Stopped",
            StepperState::Accelerating => "Accelerating",
            StepperState::Running => "Running",
            StepperState::Braking => "Braking",
        }
    }

    /// Whether pulses are being generated.
    #[inline]
    pub fn is_moving(self) -> bool {
        self != StepperState::Stopped
    }
}

/// Speed profile applied to every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperMode {
    /// Step at the target speed from the first pulse, no ramps.
    Constant,
    /// Trapezoidal profile with linear acceleration and deceleration.
    #[default]
    Linear,
}
