//! Step pulse actuation.
//!
//! Two bindings are provided: [`PinActuator`] drives a STEP/DIR driver through
//! embedded-hal output pins, [`CallbackActuator`] hands every step to a
//! caller-supplied closure per direction.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::MotorError;
use crate::motion::Direction;

/// Something that can move a stepper motor by one step.
pub trait Actuator {
    /// Error raised by the underlying hardware.
    type Error: core::fmt::Debug;

    /// Select the direction of the following pulses.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Emit one step pulse, holding it active for `width_us` microseconds
    /// when the binding controls the pulse shape.
    fn pulse<D: DelayNs>(&mut self, delay: &mut D, width_us: u32) -> Result<(), Self::Error>;
}

/// STEP/DIR driver on two embedded-hal output pins.
pub struct PinActuator<STEP, DIR>
where
    STEP: OutputPin,
    DIR: OutputPin,
{
    /// STEP pin (pulse to move one step).
    step_pin: STEP,

    /// DIR pin (high = CW, low = CCW, or inverted).
    dir_pin: DIR,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,
}

impl<STEP, DIR> PinActuator<STEP, DIR>
where
    STEP: OutputPin,
    DIR: OutputPin,
{
    /// Bind a STEP and a DIR pin.
    pub fn new(step_pin: STEP, dir_pin: DIR) -> Self {
        Self {
            step_pin,
            dir_pin,
            invert_direction: false,
            current_direction: None,
        }
    }

    /// Drive DIR low for clockwise instead of high.
    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Give the pins back.
    pub fn release(self) -> (STEP, DIR) {
        (self.step_pin, self.dir_pin)
    }
}

impl<STEP, DIR> Actuator for PinActuator<STEP, DIR>
where
    STEP: OutputPin,
    DIR: OutputPin,
{
    type Error = MotorError;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Clockwise => !self.invert_direction,
            Direction::CounterClockwise => self.invert_direction,
        };

        if pin_high {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }

        self.current_direction = Some(direction);
        Ok(())
    }

    fn pulse<D: DelayNs>(&mut self, delay: &mut D, width_us: u32) -> Result<(), Self::Error> {
        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        delay.delay_us(width_us);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)
    }
}

/// Steps delegated to one closure per direction.
///
/// The closures own the pulse shape; the pulse width is not applied.
pub struct CallbackActuator<CW, CCW>
where
    CW: FnMut(),
    CCW: FnMut(),
{
    action_cw: CW,
    action_ccw: CCW,
    direction: Direction,
}

impl<CW, CCW> CallbackActuator<CW, CCW>
where
    CW: FnMut(),
    CCW: FnMut(),
{
    /// Bind the clockwise and counter-clockwise step actions.
    pub fn new(action_cw: CW, action_ccw: CCW) -> Self {
        Self {
            action_cw,
            action_ccw,
            direction: Direction::Clockwise,
        }
    }
}

impl<CW, CCW> Actuator for CallbackActuator<CW, CCW>
where
    CW: FnMut(),
    CCW: FnMut(),
{
    type Error = Infallible;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.direction = direction;
        Ok(())
    }

    fn pulse<D: DelayNs>(&mut self, _delay: &mut D, _width_us: u32) -> Result<(), Self::Error> {
        match self.direction {
            Direction::Clockwise => (self.action_cw)(),
            Direction::CounterClockwise => (self.action_ccw)(),
        }
        Ok(())
    }
}
