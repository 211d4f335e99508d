//! Motor module for stepper-poll.
//!
//! Provides the polled stepper motor driver and position tracking.

mod builder;
mod driver;
mod position;

pub use builder::StepperMotorBuilder;
pub use driver::{OnFinish, StepperMotor, DEFAULT_PULSE_OFF_WIDTH_US, DEFAULT_PULSE_ON_WIDTH_US};
pub use position::Position;
