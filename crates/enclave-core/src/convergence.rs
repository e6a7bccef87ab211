//! Per-step bookkeeping and the termination test.
//!
//! [`SimulationState`] is a plain value: [`begin_step`] and [`finish_step`]
//! take the current state and return the next one, so the step cycle is
//! visible at the call site.

use serde::{Deserialize, Serialize};

/// Step counter, happy counter, and running flag of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Steps started so far.
    pub step: u64,
    /// Happy agents counted during the current (or last) step.
    pub happy: usize,
    /// Cleared once every active agent is happy in the same step.
    pub running: bool,
}

impl SimulationState {
    /// State of a freshly constructed model.
    pub const fn new() -> Self {
        Self {
            step: 0,
            happy: 0,
            running: true,
        }
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the run should go on after a step that ended with `happy` happy
/// agents out of `active`.
///
/// All agents happy halts the run, including the zero-agent case.
pub const fn should_continue(happy: usize, active: usize) -> bool {
    happy != active
}

/// Reset the happy counter and advance the step counter.
pub const fn begin_step(state: SimulationState) -> SimulationState {
    SimulationState {
        step: state.step.saturating_add(1),
        happy: 0,
        running: state.running,
    }
}

/// Record the step's happy count and update the running flag.
pub const fn finish_step(state: SimulationState, happy: usize, active: usize) -> SimulationState {
    SimulationState {
        step: state.step,
        happy,
        running: should_continue(happy, active),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_happy_stops() {
        for n in [0, 1, 7, 10_000] {
            assert!(!should_continue(n, n));
        }
    }

    #[test]
    fn some_unhappy_continues() {
        assert!(should_continue(3, 4));
        assert!(should_continue(0, 1));
    }

    #[test]
    fn begin_step_resets_happy() {
        let state = SimulationState {
            step: 4,
            happy: 12,
            running: true,
        };
        let next = begin_step(state);
        assert_eq!(next.step, 5);
        assert_eq!(next.happy, 0);
        assert!(next.running);
    }

    #[test]
    fn finish_step_is_idempotent_at_convergence() {
        let mut state = SimulationState::new();
        for _ in 0..5 {
            state = finish_step(begin_step(state), 9, 9);
            assert!(!state.running);
        }
        assert_eq!(state.step, 5);
    }

    #[test]
    fn finish_step_can_resume_running() {
        let state = finish_step(SimulationState::new(), 2, 2);
        assert!(!state.running);
        let state = finish_step(begin_step(state), 1, 2);
        assert!(state.running);
    }
}
