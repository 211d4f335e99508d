//! Motion module for stepper-poll.
//!
//! Provides the step interval ramp, the per-step state machine and move-time
//! planning.

mod executor;
mod planning;
mod profile;
mod state;

pub use executor::{MotionExecutor, StepOutcome};
pub use planning::MotionLimits;
pub use profile::{
    first_interval_us, interval_for_speed, ramp_steps, speed_for_interval, Direction,
    IntervalRamp, FIRST_STEP_CORRECTION, MICROS_PER_SEC,
};
pub use state::{StepperMode, StepperState};
