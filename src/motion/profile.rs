//! Step interval generation for linear acceleration ramps.
//!
//! The interval between two steps is updated incrementally after every pulse
//! with the integer recurrence
//!
//! ```text
//! c(n) = c(n-1) - (2·c(n-1) + r) / (4n + 1)
//! r    = (2·c(n) + r) mod (4n + 1)
//! ```
//!
//! which approximates `c(n) ∝ √(n+1) − √n`, the step spacing of a motor under
//! constant acceleration. Braking uses the same recurrence with `n` replaced
//! by the negated number of steps left. The remainder `r` carries the part of
//! the quotient lost to integer division into the next step so the error does
//! not compound over long ramps.

use libm::sqrtf;

/// Correction factor applied to the first step of a ramp.
///
/// The plain recurrence undershoots the first interval; 0.956 brings the
/// second step in line with the ideal constant-acceleration curve.
pub const FIRST_STEP_CORRECTION: f32 = 0.956;

/// Microseconds per second.
pub const MICROS_PER_SEC: u32 = 1_000_000;

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise (positive step count).
    #[default]
    Clockwise,
    /// Counter-clockwise (negative step count).
    CounterClockwise,
}

impl Direction {
    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Number of steps needed to go from rest to `speed` (or back) at `acceleration`.
///
/// `speed² / (2·acceleration)`, truncated. A zero acceleration yields zero.
#[inline]
pub fn ramp_steps(speed: u32, acceleration: u32) -> u32 {
    if acceleration == 0 {
        return 0;
    }
    let speed = speed as u64;
    let steps = (speed * speed) / (2 * acceleration as u64);
    steps.min(u32::MAX as u64) as u32
}

/// Interval in microseconds for a given speed in steps per second.
///
/// A zero speed maps to the longest representable interval.
#[inline]
pub fn interval_for_speed(speed: u32) -> u32 {
    if speed == 0 {
        u32::MAX
    } else {
        MICROS_PER_SEC / speed
    }
}

/// Speed in steps per second for a given interval in microseconds.
#[inline]
pub fn speed_for_interval(interval_us: u32) -> u32 {
    if interval_us == 0 {
        u32::MAX
    } else {
        MICROS_PER_SEC / interval_us
    }
}

/// Interval of the first step of a ramp starting from rest.
///
/// `0.956 · √(1 / acceleration)` seconds, in microseconds.
#[inline]
pub fn first_interval_us(acceleration: u32) -> u32 {
    if acceleration == 0 {
        return u32::MAX;
    }
    (MICROS_PER_SEC as f32 * FIRST_STEP_CORRECTION * sqrtf(1.0 / acceleration as f32)) as u32
}

/// Incremental step interval generator.
///
/// Holds the current interval, the division remainder carried between steps,
/// and the cruise interval that acts as a floor: the generator never produces
/// an interval shorter than the one matching the target speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalRamp {
    /// Current interval between steps in microseconds.
    interval: i64,

    /// Remainder of the last recurrence division.
    rest: i64,

    /// Cruise interval in microseconds (floor for `interval`).
    run_interval: i64,
}

impl IntervalRamp {
    /// Start a ramp from rest toward `speed` at `acceleration`.
    pub fn linear(speed: u32, acceleration: u32) -> Self {
        let run_interval = interval_for_speed(speed) as i64;
        let first = first_interval_us(acceleration) as i64;
        Self {
            interval: first.max(run_interval),
            rest: 0,
            run_interval,
        }
    }

    /// Run at `speed` from the very first step.
    pub fn constant(speed: u32) -> Self {
        let run_interval = interval_for_speed(speed) as i64;
        Self {
            interval: run_interval,
            rest: 0,
            run_interval,
        }
    }

    /// A ramp that never produces a step.
    pub fn idle() -> Self {
        Self {
            interval: u32::MAX as i64,
            rest: 0,
            run_interval: u32::MAX as i64,
        }
    }

    /// Current interval in microseconds.
    #[inline]
    pub fn interval(&self) -> u32 {
        self.interval.clamp(0, u32::MAX as i64) as u32
    }

    /// Cruise interval in microseconds.
    #[inline]
    pub fn run_interval(&self) -> u32 {
        self.run_interval.clamp(0, u32::MAX as i64) as u32
    }

    /// Carried division remainder.
    #[inline]
    pub fn rest(&self) -> i64 {
        self.rest
    }

    /// Instantaneous speed in steps per second.
    #[inline]
    pub fn speed(&self) -> u32 {
        speed_for_interval(self.interval())
    }

    /// Shorten the interval after step `step` of an acceleration ramp that
    /// spans `ramp_steps` steps.
    ///
    /// The remainder is dropped once the ramp length is reached.
    pub fn accelerate(&mut self, step: u32, ramp_steps: u32) {
        if step == 0 {
            return;
        }
        let denominator = 4 * step as i64 + 1;
        self.interval -= (2 * self.interval + self.rest) / denominator;
        self.rest = if step < ramp_steps {
            (2 * self.interval + self.rest) % denominator
        } else {
            0
        };
        self.clamp();
    }

    /// Lengthen the interval so the motor comes to rest after `remaining` steps.
    ///
    /// `remaining` is clamped to at least one step; the denominator
    /// `1 - 4·remaining` therefore stays at or below -3.
    pub fn decelerate(&mut self, remaining: i64) {
        let remaining = remaining.max(1);
        let denominator = 1 - 4 * remaining;
        self.interval -= (2 * self.interval + self.rest) / denominator;
        self.rest = (2 * self.interval + self.rest) % denominator;
        self.clamp();
    }

    /// Hold the cruise interval.
    pub fn cruise(&mut self) {
        self.interval = self.run_interval;
    }

    fn clamp(&mut self) {
        if self.interval < self.run_interval {
            self.interval = self.run_interval;
        }
    }
}
