//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{StepperConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks, for every stepper:
/// - Steps per revolution is non-zero
/// - Max speed is within 1..=1_000_000 steps/s
/// - Acceleration and deceleration are non-zero in linear mode
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (_, stepper) in config.steppers.iter() {
        validate_stepper(stepper)?;
    }
    Ok(())
}

/// Validate a single stepper configuration.
pub fn validate_stepper(config: &StepperConfig) -> Result<()> {
    if config.motor_steps == 0 {
        return Err(Error::Config(ConfigError::InvalidMotorSteps(
            config.motor_steps,
        )));
    }

    config.limits().validate()
}
