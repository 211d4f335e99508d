//! Basic motor control example.
//!
//! Demonstrates polling a stepper through a trapezoidal move, then a
//! continuous run that is braked to rest.
//!
//! The pins are fakes that only count edges; time comes from the OS clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use stepper_poll::{Direction, PinActuator, StdClock, StepperMotor, StepperState};

/// Delay provider backed by the OS.
struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        // In real code, this would use hardware timer
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}

/// Mock output pin for demonstration.
struct MockPin {
    state: bool,
    rising_edges: u32,
}

impl MockPin {
    fn new() -> Self {
        Self {
            state: false,
            rising_edges: 0,
        }
    }
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.state {
            self.rising_edges += 1;
        }
        self.state = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.state = false;
        Ok(())
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

fn main() -> stepper_poll::Result<()> {
    println!("=== Basic Motor Control Example ===\n");

    let mut motor = StepperMotor::builder()
        .actuator(PinActuator::new(MockPin::new(), MockPin::new()))
        .clock(StdClock::new())
        .delay(MockDelay)
        .motor_steps(200)
        .max_speed(400)
        .acceleration(800)
        .deceleration(400)
        .build()?;

    println!(
        "Move of 400 steps should take {:.3} s",
        motor.time_for_move(400)
    );

    let done = Arc::new(AtomicBool::new(false));
    let flag = done.clone();
    motor.rotate(
        400,
        Direction::Clockwise,
        Some(Box::new(move || flag.store(true, Ordering::SeqCst))),
    );

    let mut last_state = StepperState::Stopped;
    while !done.load(Ordering::SeqCst) {
        motor.update()?;
        if motor.state() != last_state {
            last_state = motor.state();
            println!(
                "{:>12} at step {:>3} ({:.1} rpm)",
                last_state.name(),
                motor.travel_current_step(),
                motor.current_speed_rpm().value()
            );
        }
        // Other work would happen here
    }

    println!(
        "Finished after {:.3} s at {:.1} degrees",
        motor.time_traveling() as f32 / 1e6,
        motor.current_angle().value()
    );

    println!("\n=== Continuous Run ===");
    motor.rotate_continuous(Direction::CounterClockwise);
    while motor.travel_current_step() < 600 {
        motor.update()?;
    }
    motor.brake();
    println!("Braking from {} steps/s", motor.current_speed());
    while motor.is_running() {
        motor.update()?;
    }

    let (actuator, _, _) = motor.release();
    let (step_pin, _) = actuator.release();
    println!("Emitted {} step pulses in total", step_pin.rising_edges);

    println!("\n=== Example Complete ===");
    Ok(())
}
