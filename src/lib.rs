//! # stepper-poll
//!
//! Non-blocking, poll-driven stepper motor control with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Cooperative polling**: `update()` emits the steps that fell due, never sleeps
//! - **Linear ramps**: Integer step-interval recurrence, no floating point per step
//! - **Asymmetric profiles**: Independent acceleration and deceleration rates
//! - **Position tracking**: Absolute step count kept across moves
//! - **embedded-hal 1.0**: `OutputPin` for STEP/DIR, `DelayNs` for pulse widths
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_poll::{Direction, PinActuator, StepperMotor};
//!
//! let mut motor = StepperMotor::builder()
//!     .actuator(PinActuator::new(step_pin, dir_pin))
//!     .clock(|| timer.now_micros())
//!     .delay(delay)
//!     .motor_steps(200)
//!     .max_speed(400)
//!     .acceleration(800)
//!     .build()?;
//!
//! motor.rotate(1600, Direction::Clockwise, None);
//! loop {
//!     motor.update()?;
//!     // other work
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and `StdClock`
//! - `alloc`: Boxed closures as completion callbacks
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod config;
pub mod error;
pub mod hal;
pub mod motion;
pub mod motor;

// Re-exports for ergonomic API
pub use config::{validate_config, StepperConfig, SystemConfig};
pub use error::{Error, Result};
pub use hal::{Actuator, CallbackActuator, Clock, PinActuator};
pub use motion::{Direction, MotionLimits, StepperMode, StepperState};
pub use motor::{OnFinish, Position, StepperMotor, StepperMotorBuilder};

#[cfg(feature = "std")]
pub use hal::StdClock;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Degrees, DegreesPerSec, RadiansPerSec, Rpm, StepsPerSec, UnitExt};
