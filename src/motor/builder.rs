//! Builder pattern for StepperMotor.

use embedded_hal::delay::DelayNs;

use crate::config::{StepperConfig, SystemConfig};
use crate::error::{ConfigError, Error, Result};
use crate::hal::{Actuator, Clock};
use crate::motion::{MotionLimits, StepperMode};

use super::driver::{StepperMotor, DEFAULT_PULSE_OFF_WIDTH_US, DEFAULT_PULSE_ON_WIDTH_US};

/// Builder for creating StepperMotor instances.
pub struct StepperMotorBuilder<A, C, D>
where
    A: Actuator,
    C: Clock,
    D: DelayNs,
{
    actuator: Option<A>,
    clock: Option<C>,
    delay: Option<D>,
    motor_steps: Option<u16>,
    limits: MotionLimits,
    pulse_on_us: u32,
    pulse_off_us: u32,
}

impl<A, C, D> Default for StepperMotorBuilder<A, C, D>
where
    A: Actuator,
    C: Clock,
    D: DelayNs,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, C, D> StepperMotorBuilder<A, C, D>
where
    A: Actuator,
    C: Clock,
    D: DelayNs,
{
    /// Create a new builder.
    ///
    /// Limits default to linear mode, 200 steps/s and 100 steps/s².
    pub fn new() -> Self {
        Self {
            actuator: None,
            clock: None,
            delay: None,
            motor_steps: None,
            limits: MotionLimits::default(),
            pulse_on_us: DEFAULT_PULSE_ON_WIDTH_US,
            pulse_off_us: DEFAULT_PULSE_OFF_WIDTH_US,
        }
    }

    /// Set the actuation binding.
    pub fn actuator(mut self, actuator: A) -> Self {
        self.actuator = Some(actuator);
        self
    }

    /// Set the microsecond clock.
    pub fn clock(mut self, clock: C) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set steps per revolution.
    pub fn motor_steps(mut self, steps: u16) -> Self {
        self.motor_steps = Some(steps);
        self
    }

    /// Set the speed profile.
    pub fn mode(mut self, mode: StepperMode) -> Self {
        self.limits.mode = mode;
        self
    }

    /// Set the cruise speed cap in steps per second.
    pub fn max_speed(mut self, speed: u32) -> Self {
        self.limits.max_speed = speed;
        self
    }

    /// Set acceleration and deceleration to the same rate in steps/s².
    pub fn acceleration(mut self, rate: u32) -> Self {
        self.limits.acceleration = rate;
        self.limits.deceleration = rate;
        self
    }

    /// Set deceleration in steps/s².
    ///
    /// Call after [`acceleration`](Self::acceleration), which overwrites it.
    pub fn deceleration(mut self, rate: u32) -> Self {
        self.limits.deceleration = rate;
        self
    }

    /// Set step pulse active time and burst spacing in microseconds.
    pub fn pulse_widths(mut self, on_us: u32, off_us: u32) -> Self {
        self.pulse_on_us = on_us;
        self.pulse_off_us = off_us;
        self
    }

    /// Configure from a StepperConfig.
    pub fn from_stepper_config(mut self, config: &StepperConfig) -> Self {
        self.motor_steps = Some(config.motor_steps);
        self.limits = config.limits();
        self.pulse_on_us = config.pulse_on_width_us;
        self.pulse_off_us = config.pulse_off_width_us;
        self
    }

    /// Configure from SystemConfig by stepper name.
    pub fn from_config(self, config: &SystemConfig, stepper_name: &str) -> Result<Self> {
        let stepper_config = config.stepper(stepper_name).ok_or_else(|| {
            Error::Config(ConfigError::StepperNotFound(
                heapless::String::try_from(stepper_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.from_stepper_config(stepper_config))
    }

    /// Build the StepperMotor.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or the limits are
    /// invalid.
    pub fn build(self) -> Result<StepperMotor<A, C, D>> {
        let actuator = self
            .actuator
            .ok_or(Error::Config(ConfigError::MissingField("actuator")))?;
        let clock = self
            .clock
            .ok_or(Error::Config(ConfigError::MissingField("clock")))?;
        let delay = self
            .delay
            .ok_or(Error::Config(ConfigError::MissingField("delay")))?;
        let motor_steps = self
            .motor_steps
            .ok_or(Error::Config(ConfigError::MissingField("motor_steps")))?;

        if motor_steps == 0 {
            return Err(Error::Config(ConfigError::InvalidMotorSteps(motor_steps)));
        }
        self.limits.validate()?;

        Ok(StepperMotor::new(
            actuator,
            clock,
            delay,
            motor_steps,
            self.limits,
            self.pulse_on_us,
            self.pulse_off_us,
        ))
    }
}

impl<A, C, D> StepperMotor<A, C, D>
where
    A: Actuator,
    C: Clock,
    D: DelayNs,
{
    /// Start building a motor.
    pub fn builder() -> StepperMotorBuilder<A, C, D> {
        StepperMotorBuilder::new()
    }
}
