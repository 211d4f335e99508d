//! Stepper motor driver.
//!
//! Generic over the actuation binding, the clock and the embedded-hal delay
//! used to shape pulses.

use embedded_hal::delay::DelayNs;

use crate::config::units::{Degrees, DegreesPerSec, RadiansPerSec, Rpm, StepsPerSec};
use crate::error::{MotorError, Result};
use crate::hal::{Actuator, Clock};
use crate::motion::{
    Direction, MotionExecutor, MotionLimits, StepOutcome, StepperMode, StepperState,
    MICROS_PER_SEC,
};

use super::position::Position;

/// Default time the step output is held active, in microseconds.
pub const DEFAULT_PULSE_ON_WIDTH_US: u32 = 10;

/// Default spacing between two pulses of a catch-up burst, in microseconds.
pub const DEFAULT_PULSE_OFF_WIDTH_US: u32 = 250;

/// Callback run when a bounded move emits its last step.
#[cfg(feature = "alloc")]
pub type OnFinish = alloc::boxed::Box<dyn FnMut() + Send>;

/// Callback run when a bounded move emits its last step.
#[cfg(not(feature = "alloc"))]
pub type OnFinish = fn();

/// Non-blocking stepper motor controller.
///
/// Nothing moves until [`update`](Self::update) is polled: every call emits
/// the pulses that fell due since the previous step and advances the speed
/// profile.
///
/// Generic over:
/// - `A`: actuation binding (must implement [`Actuator`])
/// - `C`: microsecond clock (must implement [`Clock`])
/// - `D`: delay provider for pulse shaping (must implement `DelayNs`)
pub struct StepperMotor<A, C, D>
where
    A: Actuator,
    C: Clock,
    D: DelayNs,
{
    /// Step/direction output.
    actuator: A,

    /// Time source for step scheduling.
    clock: C,

    /// Delay provider for pulse widths.
    delay: D,

    /// Absolute position, kept across moves.
    position: Position,

    /// Speed cap, rates and profile shape.
    limits: MotionLimits,

    /// Direction of the current (or last) move.
    direction: Direction,

    /// State of the current move.
    executor: MotionExecutor,

    /// Step output active time in microseconds.
    pulse_on_us: u32,

    /// Spacing between catch-up pulses in microseconds.
    pulse_off_us: u32,

    /// Scheduled time of the last step.
    last_step_time: u32,

    /// Time the current move started.
    travel_start_time: u32,

    /// Pending completion callback.
    on_finish: Option<OnFinish>,
}

impl<A, C, D> StepperMotor<A, C, D>
where
    A: Actuator,
    C: Clock,
    D: DelayNs,
{
    /// Create a stopped motor.
    ///
    /// Limits are expected to be validated by the caller.
    pub(crate) fn new(
        actuator: A,
        clock: C,
        delay: D,
        motor_steps: u16,
        limits: MotionLimits,
        pulse_on_us: u32,
        pulse_off_us: u32,
    ) -> Self {
        let now = clock.now_micros();
        Self {
            actuator,
            clock,
            delay,
            position: Position::new(motor_steps),
            limits,
            direction: Direction::Clockwise,
            executor: MotionExecutor::idle(),
            pulse_on_us,
            pulse_off_us,
            last_step_time: now,
            travel_start_time: now,
            on_finish: None,
        }
    }

    // ------------------------------------------------------------------
    // Moves
    // ------------------------------------------------------------------

    /// Move `|steps|` steps in `direction` at the configured max speed.
    ///
    /// A zero-step move completes on the spot: no pulse is emitted and
    /// `on_finish` runs before this returns.
    pub fn rotate(&mut self, steps: i32, direction: Direction, on_finish: Option<OnFinish>) {
        self.start_bounded(steps.unsigned_abs(), self.limits.max_speed, direction, on_finish);
    }

    /// Move `|steps|` steps in `direction`, taking `time` seconds.
    ///
    /// When `time` is shorter than the move takes at max speed, the move runs
    /// at max speed and simply ends late.
    pub fn rotate_in_time(
        &mut self,
        steps: i32,
        time: f32,
        direction: Direction,
        on_finish: Option<OnFinish>,
    ) {
        let steps = steps.unsigned_abs();
        let speed = self.limits.cruise_speed_for(steps, time);
        self.start_bounded(steps, speed, direction, on_finish);
    }

    /// Step in `direction` until [`stop`](Self::stop) or [`brake`](Self::brake).
    pub fn rotate_continuous(&mut self, direction: Direction) {
        self.direction = direction;
        self.executor = MotionExecutor::continuous(&self.limits, self.limits.max_speed);
        self.on_finish = None;
        self.reset_timers();

        #[cfg(feature = "defmt")]
        defmt::debug!("continuous move {} at {} steps/s", direction, self.limits.max_speed);
    }

    /// Turn by `angle` (its magnitude) in `direction`.
    pub fn rotate_angle(&mut self, angle: Degrees, direction: Direction, on_finish: Option<OnFinish>) {
        let steps = self.angle_steps(angle);
        self.start_bounded(steps, self.limits.max_speed, direction, on_finish);
    }

    /// Turn in `direction` until the shaft reaches `target` (taken modulo 360°).
    ///
    /// Already being there is a zero-step move.
    pub fn rotate_to_angle(
        &mut self,
        target: Degrees,
        direction: Direction,
        on_finish: Option<OnFinish>,
    ) {
        let steps = self.position.steps_to(target, direction);
        self.start_bounded(steps, self.limits.max_speed, direction, on_finish);
    }

    /// Turn by `angle` in `direction`, taking `time` seconds.
    pub fn rotate_angle_in_time(
        &mut self,
        angle: Degrees,
        time: f32,
        direction: Direction,
        on_finish: Option<OnFinish>,
    ) {
        let steps = self.angle_steps(angle);
        let speed = self.limits.cruise_speed_for(steps, time);
        self.start_bounded(steps, speed, direction, on_finish);
    }

    /// Turn in `direction` to `target`, taking `time` seconds.
    pub fn rotate_to_angle_in_time(
        &mut self,
        target: Degrees,
        time: f32,
        direction: Direction,
        on_finish: Option<OnFinish>,
    ) {
        let steps = self.position.steps_to(target, direction);
        let speed = self.limits.cruise_speed_for(steps, time);
        self.start_bounded(steps, speed, direction, on_finish);
    }

    /// Stop immediately.
    ///
    /// No further pulse is emitted and the pending `on_finish` is dropped
    /// without being called.
    pub fn stop(&mut self) {
        self.executor.stop();
        self.on_finish = None;
    }

    /// Ramp down to rest at the configured deceleration.
    ///
    /// The move ends after the steps needed to stop from the current speed,
    /// or earlier if it was going to end sooner. A continuous move becomes
    /// bounded; `on_finish` still fires on the last step of a bounded one.
    pub fn brake(&mut self) {
        self.executor.brake(self.limits.deceleration);
    }

    /// Emit every step that fell due since the last one.
    ///
    /// Returns the number of pulses emitted by this call; 0 when stopped.
    /// A burst ends after `u16::MAX` pulses; steps still due then go out on
    /// the next call.
    ///
    /// When the motor fell behind schedule, the missed pulses are emitted
    /// back to back in one burst, separated by the pulse-off width. Such a
    /// burst blocks the caller for about `n·pulse_on + (n-1)·pulse_off`
    /// microseconds, so polling too rarely for the configured speed makes
    /// each call proportionally longer.
    ///
    /// `on_finish` runs inside this call, on the polling thread. It should
    /// return quickly. It cannot reach the motor, so a follow-up move has to
    /// be started by the caller once `update` has returned.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::PinError` if the actuator fails; the step in
    /// flight is then not accounted for and stays due.
    pub fn update(&mut self) -> Result<u16> {
        if self.executor.is_complete() {
            return Ok(0);
        }

        let now = self.clock.now_micros();
        let mut pulses: u16 = 0;

        while now.wrapping_sub(self.last_step_time) >= self.executor.interval() {
            if pulses > 0 {
                self.delay.delay_us(self.pulse_off_us);
            }
            self.step()?;
            self.last_step_time = self.last_step_time.wrapping_add(self.executor.interval());
            pulses += 1;

            match self.executor.advance(self.limits.deceleration) {
                StepOutcome::Continue if pulses == u16::MAX => break,
                StepOutcome::Continue => {}
                StepOutcome::Finished => {
                    self.finish();
                    break;
                }
                StepOutcome::Idle => break,
            }
        }

        Ok(pulses)
    }

    fn step(&mut self) -> Result<()> {
        self.actuator
            .set_direction(self.direction)
            .map_err(|_| MotorError::PinError)?;
        self.actuator
            .pulse(&mut self.delay, self.pulse_on_us)
            .map_err(|_| MotorError::PinError)?;
        self.position.step(self.direction);
        Ok(())
    }

    fn start_bounded(
        &mut self,
        steps: u32,
        speed: u32,
        direction: Direction,
        on_finish: Option<OnFinish>,
    ) {
        self.direction = direction;
        self.executor = MotionExecutor::bounded(&self.limits, steps, speed);
        self.on_finish = on_finish;
        self.reset_timers();

        #[cfg(feature = "defmt")]
        defmt::debug!("move {} steps {} at {} steps/s", steps, direction, speed);

        if self.executor.is_complete() {
            self.finish();
        }
    }

    fn reset_timers(&mut self) {
        let now = self.clock.now_micros();
        self.last_step_time = now;
        self.travel_start_time = now;
    }

    fn finish(&mut self) {
        if let Some(callback) = self.on_finish.as_mut() {
            callback();
        }
        self.on_finish = None;
    }

    fn angle_steps(&self, angle: Degrees) -> u32 {
        let steps = angle.to_steps(self.position.motor_steps()).unsigned_abs();
        steps.min(u32::MAX as u64) as u32
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Set the cruise speed cap in steps/s. Applies from the next move.
    ///
    /// # Panics
    ///
    /// Panics if `speed` is 0 or above one step per microsecond.
    pub fn set_max_speed(&mut self, speed: u32) {
        assert!(
            speed > 0 && speed <= MICROS_PER_SEC,
            "max speed must be within 1..=1_000_000 steps/s"
        );
        self.limits.max_speed = speed;
    }

    /// Set the speed cap in revolutions per minute.
    pub fn set_speed_rpm(&mut self, speed: Rpm) {
        let steps = speed.to_steps_per_sec(self.position.motor_steps());
        self.set_max_speed(steps.whole());
    }

    /// Set the speed cap in degrees per second.
    pub fn set_speed_degrees_per_sec(&mut self, speed: DegreesPerSec) {
        let steps = speed.to_steps_per_sec(self.position.motor_steps());
        self.set_max_speed(steps.whole());
    }

    /// Set the speed cap in radians per second.
    pub fn set_speed_radians_per_sec(&mut self, speed: RadiansPerSec) {
        self.set_speed_degrees_per_sec(speed.to_degrees_per_sec());
    }

    /// Set the speed cap from the ground speed of a wheel of `wheel_radius`
    /// meters, in meters per second.
    pub fn set_linear_speed(&mut self, meters_per_sec: f32, wheel_radius: f32) {
        assert!(wheel_radius > 0.0, "wheel radius must be positive");
        self.set_speed_radians_per_sec(RadiansPerSec::from_linear(meters_per_sec, wheel_radius));
    }

    /// Set acceleration and deceleration to the same rate, in steps/s².
    pub fn set_acceleration(&mut self, rate: u32) {
        self.set_acceleration_deceleration(rate, rate);
    }

    /// Set acceleration and deceleration, in steps/s².
    ///
    /// Acceleration applies from the next move. Deceleration is read on every
    /// step, so a move in progress brakes with the new rate.
    ///
    /// # Panics
    ///
    /// Panics if either rate is 0.
    pub fn set_acceleration_deceleration(&mut self, acceleration: u32, deceleration: u32) {
        assert!(acceleration > 0, "acceleration must be positive");
        assert!(deceleration > 0, "deceleration must be positive");
        self.limits.acceleration = acceleration;
        self.limits.deceleration = deceleration;
    }

    /// Select constant or linear speed profile. Applies from the next move.
    ///
    /// # Panics
    ///
    /// Panics when switching to [`StepperMode::Linear`] while acceleration or
    /// deceleration is 0.
    pub fn set_mode(&mut self, mode: StepperMode) {
        if mode == StepperMode::Linear {
            assert!(
                self.limits.acceleration > 0 && self.limits.deceleration > 0,
                "linear mode needs positive acceleration and deceleration"
            );
        }
        self.limits.mode = mode;
    }

    /// Set the step pulse active time and the spacing between burst pulses,
    /// in microseconds.
    pub fn set_pulse_widths(&mut self, on_us: u32, off_us: u32) {
        self.pulse_on_us = on_us;
        self.pulse_off_us = off_us;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Current motion phase.
    #[inline]
    pub fn state(&self) -> StepperState {
        self.executor.state()
    }

    /// Speed profile used for new moves.
    #[inline]
    pub fn mode(&self) -> StepperMode {
        self.limits.mode
    }

    /// Direction of the current or last move.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether pulses are being generated.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state().is_moving()
    }

    /// Steps left in the current move.
    #[inline]
    pub fn remaining_steps(&self) -> i64 {
        self.executor.steps_remaining()
    }

    /// Microseconds since the current (or last) move started.
    pub fn time_traveling(&self) -> u32 {
        self.clock.elapsed_since(self.travel_start_time)
    }

    /// Shaft angle within the revolution, in `[0, 360)`.
    #[inline]
    pub fn current_angle(&self) -> Degrees {
        self.position.angle()
    }

    /// Interval until the next step, in microseconds.
    #[inline]
    pub fn current_interval(&self) -> u32 {
        self.executor.interval()
    }

    /// Instantaneous speed in steps/s (0 when stopped).
    #[inline]
    pub fn current_speed(&self) -> u32 {
        self.executor.speed()
    }

    /// Instantaneous speed in revolutions per minute.
    pub fn current_speed_rpm(&self) -> Rpm {
        StepsPerSec(self.current_speed() as f32).to_rpm(self.position.motor_steps())
    }

    /// Instantaneous speed in degrees per second.
    pub fn current_speed_degrees_per_sec(&self) -> DegreesPerSec {
        StepsPerSec(self.current_speed() as f32).to_degrees_per_sec(self.position.motor_steps())
    }

    /// Signed step count since power-on (CW positive).
    #[inline]
    pub fn absolute_step(&self) -> i64 {
        self.position.steps()
    }

    /// Position tracker.
    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Length of the current move in steps (0 for continuous moves).
    #[inline]
    pub fn travel_steps(&self) -> u32 {
        self.executor.total_steps()
    }

    /// Steps emitted since the current move started.
    #[inline]
    pub fn travel_current_step(&self) -> u32 {
        self.executor.current_step()
    }

    /// Speed cap in steps/s.
    #[inline]
    pub fn max_speed(&self) -> u32 {
        self.limits.max_speed
    }

    /// Acceleration in steps/s².
    #[inline]
    pub fn acceleration(&self) -> u32 {
        self.limits.acceleration
    }

    /// Deceleration in steps/s².
    #[inline]
    pub fn deceleration(&self) -> u32 {
        self.limits.deceleration
    }

    /// Steps per revolution.
    #[inline]
    pub fn motor_steps(&self) -> u16 {
        self.position.motor_steps()
    }

    /// Current limits.
    #[inline]
    pub fn limits(&self) -> &MotionLimits {
        &self.limits
    }

    /// Seconds a move of `steps` takes at the current limits.
    pub fn time_for_move(&self, steps: u32) -> f32 {
        self.limits.time_for_move(steps)
    }

    /// Cruise speed in steps/s that completes `steps` in `time` seconds,
    /// or 0 if no speed can.
    pub fn speed_for_move(&self, steps: u32, time: f32) -> f32 {
        self.limits.speed_for_move(steps, time)
    }

    /// Get the actuator.
    #[inline]
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Get the actuator mutably.
    #[inline]
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Take the motor apart.
    pub fn release(self) -> (A, C, D) {
        (self.actuator, self.clock, self.delay)
    }
}
