//! Position tracking for stepper motors.
//!
//! Provides absolute position tracking in steps with unit conversions.

use crate::config::units::Degrees;
use crate::motion::Direction;

/// Motor position tracker.
///
/// Counts every emitted step, signed by direction, for the lifetime of the
/// motor. The count is never reset by a move and is only reduced modulo the
/// steps per revolution when an angle is requested.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    /// Steps from the power-on position (CW positive).
    steps: i64,
    /// Steps per full revolution.
    motor_steps: u16,
}

impl Position {
    /// Create a new position tracker at zero.
    #[inline]
    pub fn new(motor_steps: u16) -> Self {
        Self {
            steps: 0,
            motor_steps,
        }
    }

    /// Create a position tracker at a specific step count.
    #[inline]
    pub fn at(steps: i64, motor_steps: u16) -> Self {
        Self { steps, motor_steps }
    }

    /// Get the absolute step count.
    #[inline]
    pub fn steps(&self) -> i64 {
        self.steps
    }

    /// Steps per full revolution.
    #[inline]
    pub fn motor_steps(&self) -> u16 {
        self.motor_steps
    }

    /// Account for one step in `direction`.
    #[inline]
    pub fn step(&mut self, direction: Direction) {
        self.steps = self.steps.wrapping_add(direction.sign());
    }

    /// Step within the current revolution, in `[0, motor_steps)`.
    #[inline]
    pub fn step_in_revolution(&self) -> u16 {
        self.steps.rem_euclid(self.motor_steps as i64) as u16
    }

    /// Angle within the current revolution, in `[0, 360)`.
    #[inline]
    pub fn angle(&self) -> Degrees {
        Degrees(360.0 * self.step_in_revolution() as f32 / self.motor_steps as f32)
    }

    /// Steps to travel in `direction` to reach `target` (taken modulo 360).
    ///
    /// Zero when already there; never a full turn.
    pub fn steps_to(&self, target: Degrees, direction: Direction) -> u32 {
        let motor_steps = self.motor_steps as i64;
        let target = target.normalized().to_steps(self.motor_steps) % motor_steps;
        let current = self.step_in_revolution() as i64;
        let delta = match direction {
            Direction::Clockwise => target - current,
            Direction::CounterClockwise => current - target,
        };
        delta.rem_euclid(motor_steps) as u32
    }
}
