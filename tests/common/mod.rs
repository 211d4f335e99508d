//! Shared test rig: a hand-driven clock, counting step callbacks and a delay
//! that only records what it was asked to wait.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use stepper_poll::{CallbackActuator, OnFinish, StepperMode, StepperMotor, StepperState};

/// Delay that adds up the requested time without waiting.
pub struct RecordingDelay {
    pub total_ns: Rc<Cell<u64>>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + ns as u64);
    }
}

pub type TestMotor = StepperMotor<
    CallbackActuator<Box<dyn FnMut()>, Box<dyn FnMut()>>,
    Box<dyn Fn() -> u32>,
    RecordingDelay,
>;

/// Handles on everything the motor under test touches.
pub struct Rig {
    pub now: Rc<Cell<u32>>,
    pub cw: Rc<Cell<u32>>,
    pub ccw: Rc<Cell<u32>>,
    pub delay_ns: Rc<Cell<u64>>,
}

/// 200 steps/rev, linear, 200 steps/s, 100 steps/s².
pub fn rig() -> (Rig, TestMotor) {
    rig_with(StepperMode::Linear, 200, 100, 100, 0)
}

pub fn rig_with(
    mode: StepperMode,
    max_speed: u32,
    acceleration: u32,
    deceleration: u32,
    start_time: u32,
) -> (Rig, TestMotor) {
    let rig = Rig {
        now: Rc::new(Cell::new(start_time)),
        cw: Rc::new(Cell::new(0)),
        ccw: Rc::new(Cell::new(0)),
        delay_ns: Rc::new(Cell::new(0)),
    };

    let cw = rig.cw.clone();
    let ccw = rig.ccw.clone();
    let now = rig.now.clone();
    let action_cw: Box<dyn FnMut()> = Box::new(move || cw.set(cw.get() + 1));
    let action_ccw: Box<dyn FnMut()> = Box::new(move || ccw.set(ccw.get() + 1));
    let clock: Box<dyn Fn() -> u32> = Box::new(move || now.get());

    let motor = StepperMotor::builder()
        .actuator(CallbackActuator::new(action_cw, action_ccw))
        .clock(clock)
        .delay(RecordingDelay {
            total_ns: rig.delay_ns.clone(),
        })
        .motor_steps(200)
        .mode(mode)
        .max_speed(max_speed)
        .acceleration(acceleration)
        .deceleration(deceleration)
        .build()
        .expect("valid test motor");

    (rig, motor)
}

/// Completion callback counting its invocations.
pub fn finish_counter() -> (Arc<AtomicU32>, Option<OnFinish>) {
    let count = Arc::new(AtomicU32::new(0));
    let handle = count.clone();
    let callback: OnFinish = Box::new(move || {
        handle.fetch_add(1, Ordering::SeqCst);
    });
    (count, Some(callback))
}

pub fn count(counter: &Arc<AtomicU32>) -> u32 {
    counter.load(Ordering::SeqCst)
}

impl Rig {
    /// Total pulses in both directions.
    pub fn pulses(&self) -> u32 {
        self.cw.get() + self.ccw.get()
    }

    /// Move the clock to the next scheduled step and poll once.
    pub fn tick(&self, motor: &mut TestMotor) -> u16 {
        self.now
            .set(self.now.get().wrapping_add(motor.current_interval()));
        motor.update().expect("callback actuator never fails")
    }

    /// Poll step by step until the motor stops, recording the state seen
    /// before each pulse as `(state, consecutive pulses)`.
    pub fn run_to_stop(&self, motor: &mut TestMotor) -> Vec<(StepperState, u32)> {
        let mut phases: Vec<(StepperState, u32)> = Vec::new();
        let mut guard = 0u32;
        while motor.is_running() {
            let state = motor.state();
            assert_eq!(self.tick(motor), 1);
            match phases.last_mut() {
                Some((last, n)) if *last == state => *n += 1,
                _ => phases.push((state, 1)),
            }
            guard += 1;
            assert!(guard < 1_000_000, "move never stopped");
        }
        phases
    }
}
