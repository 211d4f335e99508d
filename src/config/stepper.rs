//! Stepper configuration from TOML.

use heapless::String;
use serde::Deserialize;

use crate::motion::{MotionLimits, StepperMode};
use crate::motor::{DEFAULT_PULSE_OFF_WIDTH_US, DEFAULT_PULSE_ON_WIDTH_US};

/// Complete configuration of one stepper.
#[derive(Debug, Clone, Deserialize)]
pub struct StepperConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Steps per revolution (typically 200 for 1.8° motors).
    pub motor_steps: u16,

    /// Speed profile.
    #[serde(default)]
    pub mode: StepperMode,

    /// Cruise speed cap in steps per second.
    #[serde(rename = "max_speed_steps_per_sec")]
    pub max_speed: u32,

    /// Acceleration in steps per second squared.
    #[serde(rename = "acceleration_steps_per_sec2")]
    pub acceleration: u32,

    /// Deceleration in steps per second squared (defaults to `acceleration`).
    #[serde(default, rename = "deceleration_steps_per_sec2")]
    pub deceleration: Option<u32>,

    /// Step output active time in microseconds.
    #[serde(default = "default_pulse_on_width")]
    pub pulse_on_width_us: u32,

    /// Spacing between catch-up pulses in microseconds.
    #[serde(default = "default_pulse_off_width")]
    pub pulse_off_width_us: u32,
}

fn default_pulse_on_width() -> u32 {
    DEFAULT_PULSE_ON_WIDTH_US
}

fn default_pulse_off_width() -> u32 {
    DEFAULT_PULSE_OFF_WIDTH_US
}

impl StepperConfig {
    /// Effective deceleration.
    pub fn deceleration(&self) -> u32 {
        self.deceleration.unwrap_or(self.acceleration)
    }

    /// Motion limits described by this configuration.
    pub fn limits(&self) -> MotionLimits {
        MotionLimits {
            mode: self.mode,
            max_speed: self.max_speed,
            acceleration: self.acceleration,
            deceleration: self.deceleration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deceleration_defaults_to_acceleration() {
        let mut config = StepperConfig {
            name: String::try_from("test").unwrap(),
            motor_steps: 200,
            mode: StepperMode::Linear,
            max_speed: 400,
            acceleration: 800,
            deceleration: None,
            pulse_on_width_us: 10,
            pulse_off_width_us: 250,
        };
        assert_eq!(config.limits().deceleration, 800);

        config.deceleration = Some(200);
        assert_eq!(config.limits().deceleration, 200);
        assert_eq!(config.limits().acceleration, 800);
    }
}
