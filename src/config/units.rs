//! Unit types for physical quantities.
//!
//! Provides type-safe representations of angles and speeds so that a speed in
//! RPM is never mistaken for one in degrees per second. Everything converts to
//! the engine's native unit, steps per second, through the motor's steps per
//! revolution.

use serde::Deserialize;

/// Angular position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f32);

impl Degrees {
    /// Create a new Degrees value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Wrap into `[0, 360)`.
    #[inline]
    pub fn normalized(self) -> Self {
        let wrapped = self.0 % 360.0;
        if wrapped < 0.0 {
            // -1e-6 % 360 + 360 rounds to 360.0 in f32
            let shifted = wrapped + 360.0;
            Self(if shifted >= 360.0 { 0.0 } else { shifted })
        } else {
            Self(wrapped)
        }
    }

    /// Number of whole steps covering this angle (truncated toward zero).
    #[inline]
    pub fn to_steps(self, motor_steps: u16) -> i64 {
        (self.0 / 360.0 * motor_steps as f32) as i64
    }
}

/// Step rate in steps per second, the engine's native speed unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct StepsPerSec(pub f32);

impl StepsPerSec {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Convert to revolutions per minute.
    #[inline]
    pub fn to_rpm(self, motor_steps: u16) -> Rpm {
        Rpm(self.0 / motor_steps as f32 * 60.0)
    }

    /// Convert to degrees per second.
    #[inline]
    pub fn to_degrees_per_sec(self, motor_steps: u16) -> DegreesPerSec {
        DegreesPerSec(self.0 / motor_steps as f32 * 360.0)
    }

    /// Truncate to whole steps per second, as the engine stores speeds.
    #[inline]
    pub fn whole(self) -> u32 {
        if self.0 <= 0.0 {
            0
        } else {
            self.0 as u32
        }
    }
}

/// Angular velocity in revolutions per minute.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Rpm(pub f32);

impl Rpm {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Convert to steps per second.
    #[inline]
    pub fn to_steps_per_sec(self, motor_steps: u16) -> StepsPerSec {
        StepsPerSec(self.0 / 60.0 * motor_steps as f32)
    }
}

/// Angular velocity in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct DegreesPerSec(pub f32);

impl DegreesPerSec {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Convert to steps per second.
    #[inline]
    pub fn to_steps_per_sec(self, motor_steps: u16) -> StepsPerSec {
        StepsPerSec(self.0 / 360.0 * motor_steps as f32)
    }
}

/// Angular velocity in radians per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct RadiansPerSec(pub f32);

impl RadiansPerSec {
    /// Angular velocity of a wheel of `radius` meters rolling at `meters_per_sec`.
    #[inline]
    pub fn from_linear(meters_per_sec: f32, radius: f32) -> Self {
        Self(meters_per_sec / radius)
    }

    /// Convert to degrees per second.
    #[inline]
    pub fn to_degrees_per_sec(self) -> DegreesPerSec {
        DegreesPerSec(self.0.to_degrees())
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Degrees.
    fn degrees(self) -> Degrees;
    /// Convert to DegreesPerSec.
    fn degrees_per_sec(self) -> DegreesPerSec;
    /// Convert to Rpm.
    fn rpm(self) -> Rpm;
}

impl UnitExt for f32 {
    #[inline]
    fn degrees(self) -> Degrees {
        Degrees(self)
    }

    #[inline]
    fn degrees_per_sec(self) -> DegreesPerSec {
        DegreesPerSec(self)
    }

    #[inline]
    fn rpm(self) -> Rpm {
        Rpm(self)
    }
}
