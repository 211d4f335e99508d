//! Configuration module for stepper-poll.
//!
//! Provides types for loading and validating stepper configurations from
//! TOML files (with `std` feature) or pre-parsed data.

mod stepper;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use stepper::StepperConfig;
pub use system::SystemConfig;
pub use validation::{validate_config, validate_stepper};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Degrees, DegreesPerSec, RadiansPerSec, Rpm, StepsPerSec, UnitExt};
