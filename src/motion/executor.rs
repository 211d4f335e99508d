//! Motion execution - per-step state machine.

use super::planning::MotionLimits;
use super::profile::{ramp_steps, IntervalRamp};
use super::state::{StepperMode, StepperState};

/// What happened to the move after a step was accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// More steps are due.
    Continue,
    /// That was the last step of a bounded move.
    Finished,
    /// No move was in progress; nothing was accounted for.
    Idle,
}

/// Runtime state of the move in progress.
///
/// Tracks how far the move has gone, decides the motion phase after every
/// step and drives the interval ramp accordingly.
#[derive(Debug, Clone)]
pub struct MotionExecutor {
    /// Current phase.
    state: StepperState,

    /// Profile shape of this move.
    mode: StepperMode,

    /// Total steps requested (ignored when continuous).
    travel_steps: u32,

    /// Steps emitted since the move started.
    current_step: u32,

    /// Unbounded move; only `stop()` or `brake()` end it.
    continuous: bool,

    /// Steps needed to reach the target speed.
    acc_steps: u32,

    /// Steps needed to stop from the current speed (last evaluation).
    dec_steps: u32,

    /// Interval generator.
    ramp: IntervalRamp,
}

impl Default for MotionExecutor {
    fn default() -> Self {
        Self::idle()
    }
}

impl MotionExecutor {
    /// An executor with no move.
    pub fn idle() -> Self {
        Self {
            state: StepperState::Stopped,
            mode: StepperMode::Linear,
            travel_steps: 0,
            current_step: 0,
            continuous: false,
            acc_steps: 0,
            dec_steps: 0,
            ramp: IntervalRamp::idle(),
        }
    }

    /// Start a move of `steps` steps with a cruise speed of `speed`.
    ///
    /// A zero-step move is complete before it starts.
    pub fn bounded(limits: &MotionLimits, steps: u32, speed: u32) -> Self {
        if steps == 0 {
            return Self::idle();
        }
        Self::start(limits, steps, speed, false)
    }

    /// Start an unbounded move with a cruise speed of `speed`.
    pub fn continuous(limits: &MotionLimits, speed: u32) -> Self {
        Self::start(limits, 0, speed, true)
    }

    fn start(limits: &MotionLimits, travel_steps: u32, speed: u32, continuous: bool) -> Self {
        let (state, ramp) = match limits.mode {
            StepperMode::Constant => (StepperState::Running, IntervalRamp::constant(speed)),
            StepperMode::Linear => (
                StepperState::Accelerating,
                IntervalRamp::linear(speed, limits.acceleration),
            ),
        };

        Self {
            state,
            mode: limits.mode,
            travel_steps,
            current_step: 0,
            continuous,
            acc_steps: limits.acceleration_steps(speed),
            dec_steps: 0,
            ramp,
        }
    }

    /// Current phase.
    #[inline]
    pub fn state(&self) -> StepperState {
        self.state
    }

    /// Whether the move has ended.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.state == StepperState::Stopped
    }

    /// Whether the move is unbounded.
    #[inline]
    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Steps emitted since the move started.
    #[inline]
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    /// Total steps of the move (0 for continuous moves).
    #[inline]
    pub fn total_steps(&self) -> u32 {
        self.travel_steps
    }

    /// Steps left in the move; negative once a continuous move is past its
    /// nominal zero length.
    #[inline]
    pub fn steps_remaining(&self) -> i64 {
        self.travel_steps as i64 - self.current_step as i64
    }

    /// Steps of the acceleration ramp.
    #[inline]
    pub fn acceleration_steps(&self) -> u32 {
        self.acc_steps
    }

    /// Steps needed to stop, as of the last evaluation.
    #[inline]
    pub fn deceleration_steps(&self) -> u32 {
        self.dec_steps
    }

    /// Interval until the next step in microseconds.
    #[inline]
    pub fn interval(&self) -> u32 {
        self.ramp.interval()
    }

    /// Cruise interval in microseconds.
    #[inline]
    pub fn run_interval(&self) -> u32 {
        self.ramp.run_interval()
    }

    /// Instantaneous speed in steps/s (0 when stopped).
    #[inline]
    pub fn speed(&self) -> u32 {
        if self.is_complete() {
            0
        } else {
            self.ramp.speed()
        }
    }

    /// Account for one emitted step, then pick the next phase and interval.
    ///
    /// `deceleration` is read on every call so a rate changed mid-move takes
    /// effect on the next braking decision.
    pub fn advance(&mut self, deceleration: u32) -> StepOutcome {
        if self.is_complete() {
            return StepOutcome::Idle;
        }

        self.current_step = self.current_step.saturating_add(1);

        let outcome = self.update_state(deceleration);
        if outcome == StepOutcome::Continue {
            self.update_interval();
        }
        outcome
    }

    fn update_state(&mut self, deceleration: u32) -> StepOutcome {
        let remaining = self.steps_remaining();
        if !self.continuous && remaining <= 0 {
            self.set_state(StepperState::Stopped);
            return StepOutcome::Finished;
        }

        if self.mode == StepperMode::Constant || self.state == StepperState::Braking {
            return StepOutcome::Continue;
        }

        self.dec_steps = ramp_steps(self.ramp.speed(), deceleration);
        if !self.continuous && remaining <= self.dec_steps as i64 {
            self.set_state(StepperState::Braking);
        } else if self.current_step <= self.acc_steps {
            self.set_state(StepperState::Accelerating);
        } else {
            self.set_state(StepperState::Running);
        }

        StepOutcome::Continue
    }

    fn update_interval(&mut self) {
        match self.state {
            StepperState::Accelerating => self.ramp.accelerate(self.current_step, self.acc_steps),
            StepperState::Braking => self.ramp.decelerate(self.steps_remaining()),
            StepperState::Running => self.ramp.cruise(),
            StepperState::Stopped => {}
        }
    }

    fn set_state(&mut self, state: StepperState) {
        if state != self.state {
            #[cfg(feature = "defmt")]
            defmt::trace!(
                "{} -> {} at step {}",
                self.state,
                state,
                self.current_step
            );
            self.state = state;
        }
    }

    /// End the move immediately.
    pub fn stop(&mut self) {
        self.set_state(StepperState::Stopped);
    }

    /// Start braking now.
    ///
    /// The move is cut to the distance needed to stop from the current speed
    /// at `deceleration` (at least one step), unless it would end sooner
    /// anyway. A continuous move becomes bounded.
    pub fn brake(&mut self, deceleration: u32) {
        if self.is_complete() {
            return;
        }

        let stopping = ramp_steps(self.ramp.speed(), deceleration).max(1);
        let end = self.current_step.saturating_add(stopping);
        if self.continuous || end < self.travel_steps {
            self.travel_steps = end;
            self.continuous = false;
        }
        self.dec_steps = stopping;
        self.set_state(StepperState::Braking);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> MotionLimits {
        MotionLimits {
            mode: StepperMode::Linear,
            max_speed: 200,
            acceleration: 100,
            deceleration: 100,
        }
    }

    /// Count steps spent in each phase, in order of appearance.
    fn phases(executor: &mut MotionExecutor) -> Vec<(StepperState, u32)> {
        let mut phases: Vec<(StepperState, u32)> = Vec::new();
        while !executor.is_complete() {
            let state = executor.state();
            match phases.last_mut() {
                Some((last, count)) if *last == state => *count += 1,
                _ => phases.push((state, 1)),
            }
            executor.advance(100);
        }
        phases
    }

    #[test]
    fn test_executor_complete() {
        let mut executor = MotionExecutor::bounded(&limits(), 10, 200);

        assert!(!executor.is_complete());
        assert_eq!(executor.current_step(), 0);

        let mut finished = 0;
        for _ in 0..10 {
            if executor.advance(100) == StepOutcome::Finished {
                finished += 1;
            }
        }

        assert_eq!(finished, 1);
        assert!(executor.is_complete());
        assert_eq!(executor.current_step(), 10);
    }

    #[test]
    fn test_zero_move() {
        let executor = MotionExecutor::bounded(&limits(), 0, 200);
        assert!(executor.is_complete());
        assert_eq!(executor.steps_remaining(), 0);
    }

    #[test]
    fn test_trapezoid_phases() {
        let mut executor = MotionExecutor::bounded(&limits(), 1000, 200);
        assert_eq!(executor.acceleration_steps(), 200);
        assert_eq!(
            phases(&mut executor),
            [
                (StepperState::Accelerating, 201),
                (StepperState::Running, 599),
                (StepperState::Braking, 200),
            ]
        );
    }

    #[test]
    fn test_triangle_phases() {
        let mut executor = MotionExecutor::bounded(&limits(), 100, 200);
        assert_eq!(
            phases(&mut executor),
            [
                (StepperState::Accelerating, 51),
                (StepperState::Braking, 49),
            ]
        );
    }

    #[test]
    fn test_asymmetric_phases() {
        let l = MotionLimits {
            max_speed: 800,
            acceleration: 400,
            deceleration: 200,
            ..limits()
        };
        let mut executor = MotionExecutor::bounded(&l, 3000, 800);
        let mut seen = Vec::new();
        while !executor.is_complete() {
            let state = executor.state();
            if seen.last() != Some(&state) {
                seen.push(state);
            }
            executor.advance(200);
        }
        assert_eq!(
            seen,
            [
                StepperState::Accelerating,
                StepperState::Running,
                StepperState::Braking,
            ]
        );
    }

    #[test]
    fn test_interval_never_below_run_interval() {
        let mut executor = MotionExecutor::bounded(&limits(), 1000, 200);
        while !executor.is_complete() {
            assert!(executor.interval() >= executor.run_interval());
            executor.advance(100);
        }
    }

    #[test]
    fn test_constant_mode_runs_flat() {
        let l = MotionLimits {
            mode: StepperMode::Constant,
            ..limits()
        };
        let mut executor = MotionExecutor::bounded(&l, 50, 400);
        assert_eq!(executor.state(), StepperState::Running);
        while !executor.is_complete() {
            assert_eq!(executor.interval(), 2_500);
            assert_eq!(executor.state(), StepperState::Running);
            executor.advance(100);
        }
    }

    #[test]
    fn test_continuous_never_finishes() {
        let mut executor = MotionExecutor::continuous(&limits(), 200);
        for _ in 0..5_000 {
            assert_eq!(executor.advance(100), StepOutcome::Continue);
        }
        assert_eq!(executor.state(), StepperState::Running);
        assert_eq!(executor.interval(), 5_000);
    }

    #[test]
    fn test_brake_continuous_move_comes_to_rest() {
        let mut executor = MotionExecutor::continuous(&limits(), 200);
        for _ in 0..1_000 {
            executor.advance(100);
        }
        executor.brake(100);
        assert_eq!(executor.state(), StepperState::Braking);
        assert!(!executor.is_continuous());
        // 200² / 200
        assert_eq!(executor.steps_remaining(), 200);

        let mut previous = executor.interval();
        let mut steps = 0;
        while executor.advance(100) == StepOutcome::Continue {
            assert!(executor.interval() >= previous);
            previous = executor.interval();
            steps += 1;
        }
        assert_eq!(steps + 1, 200);
    }

    #[test]
    fn test_brake_shortens_bounded_move() {
        let mut executor = MotionExecutor::bounded(&limits(), 1000, 200);
        for _ in 0..50 {
            executor.advance(100);
        }
        executor.brake(100);
        assert_eq!(executor.state(), StepperState::Braking);
        assert_eq!(
            executor.steps_remaining(),
            executor.deceleration_steps() as i64
        );
        assert!(executor.total_steps() < 1000);
    }

    #[test]
    fn test_brake_keeps_shorter_remaining_distance() {
        let mut executor = MotionExecutor::bounded(&limits(), 1000, 200);
        for _ in 0..995 {
            executor.advance(100);
        }
        let remaining = executor.steps_remaining();
        // A gentle rate needs far more than the 5 steps left
        executor.brake(10);
        assert_eq!(executor.steps_remaining(), remaining);
        assert_eq!(executor.total_steps(), 1000);
        assert_eq!(executor.state(), StepperState::Braking);
    }

    #[test]
    fn test_stop_is_immediate() {
        let mut executor = MotionExecutor::bounded(&limits(), 1000, 200);
        executor.advance(100);
        executor.stop();
        assert!(executor.is_complete());
        assert_eq!(executor.speed(), 0);
        assert_eq!(executor.advance(100), StepOutcome::Idle);
        assert_eq!(executor.current_step(), 1);
    }
}
