//! Hardware collaborators of the stepping engine.
//!
//! The engine never touches hardware directly: step pulses go through an
//! [`Actuator`] and time comes from a [`Clock`]. Pulse widths are produced
//! with an embedded-hal [`DelayNs`](embedded_hal::delay::DelayNs).

mod actuator;
mod clock;

pub use actuator::{Actuator, CallbackActuator, PinActuator};
pub use clock::Clock;

#[cfg(feature = "std")]
pub use clock::StdClock;
