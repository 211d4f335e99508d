//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_poll::load_config;
///
/// let config = load_config("motion.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    // Validate the configuration
    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::StepperMode;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[steppers.turntable]
name = "Turntable"
motor_steps = 200
max_speed_steps_per_sec = 400
acceleration_steps_per_sec2 = 800
"#;

        let config = parse_config(toml).unwrap();
        let stepper = config.stepper("turntable").unwrap();
        assert_eq!(stepper.mode, StepperMode::Linear);
        assert_eq!(stepper.deceleration(), 800);
        assert_eq!(stepper.pulse_on_width_us, 10);
        assert_eq!(stepper.pulse_off_width_us, 250);
    }

    #[test]
    fn test_parse_constant_stepper() {
        let toml = r#"
[steppers.feeder]
name = "Feeder"
motor_steps = 48
mode = "constant"
max_speed_steps_per_sec = 96
acceleration_steps_per_sec2 = 0
pulse_on_width_us = 5
"#;

        let config = parse_config(toml).unwrap();
        let stepper = config.stepper("feeder").unwrap();
        assert_eq!(stepper.mode, StepperMode::Constant);
        assert_eq!(stepper.pulse_on_width_us, 5);
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let toml = r#"
[steppers.bad]
name = "Bad"
motor_steps = 0
max_speed_steps_per_sec = 400
acceleration_steps_per_sec2 = 800
"#;

        assert!(matches!(
            parse_config(toml),
            Err(Error::Config(ConfigError::InvalidMotorSteps(0)))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_config("[steppers.x]\nname = 3"),
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_config("/nonexistent/stepper-poll.toml"),
            Err(Error::Config(ConfigError::IoError(_)))
        ));
    }
}
