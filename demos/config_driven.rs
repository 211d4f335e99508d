//! Example: Configuration-driven motor setup.
//!
//! This example demonstrates how to:
//! - Load stepper configuration from TOML
//! - Build a motor from a named configuration entry
//! - Drive angle moves and timed moves by polling
//!
//! Run with: `cargo run --example config_driven --features std`

use std::cell::Cell;
use std::rc::Rc;

use stepper_poll::{
    error::Result, parse_config, CallbackActuator, Degrees, Direction, StepperMotor,
};

/// Mock delay for demonstration.
struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {
        // In real code, this would actually delay
    }
}

fn main() -> Result<()> {
    println!("=== Configuration-Driven Example ===\n");

    let toml_content = r#"
[steppers.turntable]
name = "turntable"
motor_steps = 200
max_speed_steps_per_sec = 400
acceleration_steps_per_sec2 = 800
deceleration_steps_per_sec2 = 400

[steppers.feeder]
name = "feeder"
motor_steps = 48
mode = "constant"
max_speed_steps_per_sec = 96
acceleration_steps_per_sec2 = 1
"#;

    let config = parse_config(toml_content)?;
    for name in config.stepper_names() {
        if let Some(stepper) = config.stepper(name) {
            println!(
                "{}: {} steps/rev, {:?}, {} steps/s",
                name, stepper.motor_steps, stepper.mode, stepper.max_speed
            );
        }
    }

    // Simulated time: every poll jumps straight to the next step
    let now = Rc::new(Cell::new(0u32));
    let clock = {
        let now = now.clone();
        move || now.get()
    };

    let mut motor = StepperMotor::builder()
        .from_config(&config, "turntable")?
        .actuator(CallbackActuator::new(|| {}, || {}))
        .clock(clock)
        .delay(MockDelay)
        .build()?;

    println!("\n=== Angle Moves ===");
    for (target, direction) in [
        (Degrees(90.0), Direction::Clockwise),
        (Degrees(45.0), Direction::Clockwise),
        (Degrees(300.0), Direction::CounterClockwise),
    ] {
        motor.rotate_to_angle(target, direction, None);
        let steps = motor.travel_steps();
        while motor.is_running() {
            now.set(now.get().wrapping_add(motor.current_interval()));
            motor.update()?;
        }
        println!(
            "{:?} to {:>5.1}°: {:>3} steps in {:.3} s",
            direction,
            motor.current_angle().value(),
            steps,
            motor.time_traveling() as f32 / 1e6
        );
    }

    println!("\n=== Timed Move ===");
    let planned = 4.0;
    motor.rotate_in_time(1000, planned, Direction::Clockwise, None);
    while motor.is_running() {
        now.set(now.get().wrapping_add(motor.current_interval()));
        motor.update()?;
    }
    println!(
        "1000 steps planned for {:.1} s, took {:.3} s",
        planned,
        motor.time_traveling() as f32 / 1e6
    );

    if config.stepper("spindle").is_none() {
        println!("\nNo 'spindle' stepper configured");
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
