//! Move-time planning.
//!
//! Closed-form duration of a move under a trapezoidal (or triangular) speed
//! profile, and its inverse: the cruise speed that completes a move in a
//! given time.

use libm::sqrtf;

use crate::error::{ConfigError, Result};

use super::profile::{ramp_steps, MICROS_PER_SEC};
use super::state::StepperMode;

/// Speed limits and profile shape shared by every move of a stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionLimits {
    /// Speed profile.
    pub mode: StepperMode,
    /// Cruise speed cap in steps/s.
    pub max_speed: u32,
    /// Acceleration in steps/s².
    pub acceleration: u32,
    /// Deceleration in steps/s².
    pub deceleration: u32,
}

impl Default for MotionLimits {
    fn default() -> Self {
        Self {
            mode: StepperMode::Linear,
            max_speed: 200,
            acceleration: 100,
            deceleration: 100,
        }
    }
}

impl MotionLimits {
    /// Check that the limits describe a motion the engine can run.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for a zero speed or one above a step per
    /// microsecond, or a zero acceleration or deceleration in linear mode.
    pub fn validate(&self) -> Result<()> {
        if self.max_speed == 0 || self.max_speed > MICROS_PER_SEC {
            return Err(ConfigError::InvalidMaxSpeed(self.max_speed).into());
        }
        if self.mode == StepperMode::Linear {
            if self.acceleration == 0 {
                return Err(ConfigError::InvalidAcceleration(self.acceleration).into());
            }
            if self.deceleration == 0 {
                return Err(ConfigError::InvalidDeceleration(self.deceleration).into());
            }
        }
        Ok(())
    }

    /// Steps needed to reach `speed` from rest.
    #[inline]
    pub fn acceleration_steps(&self, speed: u32) -> u32 {
        ramp_steps(speed, self.acceleration)
    }

    /// Steps needed to come to rest from `speed`.
    #[inline]
    pub fn deceleration_steps(&self, speed: u32) -> u32 {
        ramp_steps(speed, self.deceleration)
    }

    /// Seconds needed to travel `steps` at `max_speed`.
    pub fn time_for_move(&self, steps: u32) -> f32 {
        self.time_for_move_at(steps, self.max_speed)
    }

    /// Seconds needed to travel `steps` with a cruise speed of `speed`.
    ///
    /// When the move is too short to reach `speed`, the two ramps are
    /// shortened in proportion to the rates so the profile becomes a
    /// triangle.
    pub fn time_for_move_at(&self, steps: u32, speed: u32) -> f32 {
        if steps == 0 {
            return 0.0;
        }
        if speed == 0 {
            return f32::INFINITY;
        }

        let steps = steps as f32;
        let speed_f = speed as f32;

        match self.mode {
            StepperMode::Constant => steps / speed_f,
            StepperMode::Linear => {
                let acceleration = self.acceleration as f32;
                let deceleration = self.deceleration as f32;

                let mut acc_steps = self.acceleration_steps(speed) as f32;
                let mut dec_steps = self.deceleration_steps(speed) as f32;
                let ramps = acc_steps + dec_steps;

                let run_steps = if steps < ramps {
                    acc_steps = steps * deceleration / (acceleration + deceleration);
                    dec_steps = steps - acc_steps;
                    0.0
                } else {
                    steps - ramps
                };

                run_steps / speed_f
                    + sqrtf(2.0 * acc_steps / acceleration)
                    + sqrtf(2.0 * dec_steps / deceleration)
            }
        }
    }

    /// Cruise speed in steps/s that completes `steps` in `time` seconds.
    ///
    /// Returns 0 when the move cannot be completed in `time` whatever the
    /// speed.
    pub fn speed_for_move(&self, steps: u32, time: f32) -> f32 {
        if time <= 0.0 {
            return 0.0;
        }
        let steps = steps as f32;

        match self.mode {
            StepperMode::Constant => steps / time,
            StepperMode::Linear => {
                let a_2 = 1.0 / self.acceleration as f32 + 1.0 / self.deceleration as f32;
                let discriminant = time * time - 2.0 * a_2 * steps;
                if discriminant >= 0.0 {
                    (time - sqrtf(discriminant)) / a_2
                } else {
                    0.0
                }
            }
        }
    }

    /// Cruise speed used for a move of `steps` that should last `time` seconds.
    ///
    /// Falls back to `max_speed` when `time` is shorter than the move takes
    /// at full speed.
    pub fn cruise_speed_for(&self, steps: u32, time: f32) -> u32 {
        if self.time_for_move(steps) > time {
            return self.max_speed;
        }
        let speed = self.speed_for_move(steps, time);
        if speed <= 0.0 {
            self.max_speed
        } else {
            (speed as u32).clamp(1, self.max_speed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> MotionLimits {
        MotionLimits {
            mode: StepperMode::Linear,
            max_speed: 200,
            acceleration: 100,
            deceleration: 100,
        }
    }

    #[test]
    fn test_trapezoid_time() {
        // 200 + 200 ramp steps, 600 cruise steps: 3 s + 2 s + 2 s
        let t = limits().time_for_move(1000);
        assert!((t - 7.0).abs() < 0.001);
    }

    #[test]
    fn test_triangle_time() {
        // 100 steps never reach 200 steps/s: two 50 step ramps of 1 s each
        let t = limits().time_for_move(100);
        assert!((t - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_asymmetric_triangle_split() {
        let l = MotionLimits {
            deceleration: 300,
            ..limits()
        };
        // acc' = 100 * 300 / 400 = 75, dec' = 25
        let expected = sqrtf(2.0 * 75.0 / 100.0) + sqrtf(2.0 * 25.0 / 300.0);
        assert!((l.time_for_move(100) - expected).abs() < 0.001);
    }

    #[test]
    fn test_constant_time() {
        let l = MotionLimits {
            mode: StepperMode::Constant,
            ..limits()
        };
        assert!((l.time_for_move(400) - 2.0).abs() < 0.0001);
        assert!((l.speed_for_move(400, 4.0) - 100.0).abs() < 0.0001);
    }

    #[test]
    fn test_zero_steps_take_no_time() {
        assert_eq!(limits().time_for_move(0), 0.0);
        assert_eq!(limits().time_for_move_at(10, 0), f32::INFINITY);
    }

    #[test]
    fn test_speed_for_move_inverts_time_for_move() {
        let speed = limits().speed_for_move(1000, 7.0);
        assert!((speed - 200.0).abs() < 0.05);

        let speed = limits().speed_for_move(1000, 10.0);
        assert!((speed - 112.70).abs() < 0.05);
        let t = limits().time_for_move_at(1000, speed as u32);
        assert!((t - 10.0).abs() < 0.1);
    }

    #[test]
    fn test_speed_for_impossible_move() {
        // Even a pure triangle needs 2·sqrt(1000/100) s
        assert_eq!(limits().speed_for_move(1000, 1.0), 0.0);
        assert_eq!(limits().speed_for_move(1000, 0.0), 0.0);
    }

    #[test]
    fn test_cruise_speed_falls_back_to_max() {
        assert_eq!(limits().cruise_speed_for(1000, 1.0), 200);
        assert_eq!(limits().cruise_speed_for(1000, 5.0), 200);
        let slow = limits().cruise_speed_for(1000, 10.0);
        assert!((111..=113).contains(&slow));
    }

    #[test]
    fn test_validate() {
        assert!(limits().validate().is_ok());
        assert!(MotionLimits { acceleration: 0, ..limits() }.validate().is_err());
        assert!(MotionLimits { deceleration: 0, ..limits() }.validate().is_err());
        assert!(MotionLimits { max_speed: 0, ..limits() }.validate().is_err());
        assert!(MotionLimits { max_speed: 2_000_000, ..limits() }.validate().is_err());
        let constant = MotionLimits {
            mode: StepperMode::Constant,
            acceleration: 0,
            deceleration: 0,
            ..limits()
        };
        assert!(constant.validate().is_ok());
    }
}
