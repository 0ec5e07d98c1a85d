use std::fmt;

use serde::{Deserialize, Serialize};

/// The four states of a ritual.
///
/// A ritual flows: IDLE → SEVERING → COMPLETE | FAILED, and back to IDLE on
/// reset (or automatically from FAILED after the auto-reset delay).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RitualState {
    Idle,
    Severing,
    Complete,
    Failed,
}

impl RitualState {
    /// Whether a new file may be submitted in this state.
    pub fn accepts_input(self) -> bool {
        matches!(self, RitualState::Idle | RitualState::Failed)
    }
}

impl fmt::Display for RitualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RitualState::Idle => write!(f, "IDLE"),
            RitualState::Severing => write!(f, "SEVERING"),
            RitualState::Complete => write!(f, "COMPLETE"),
            RitualState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Events that drive the ritual state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RitualEvent {
    /// A file was handed to the controller.
    Submitted,
    /// The removal call returned the processed bytes.
    Severed,
    /// The removal call failed.
    SeverFailed,
    /// The auto-reset delay elapsed while failed.
    TimedOut,
    /// The user asked to discard the current result.
    ResetRequested,
}

/// The result of evaluating a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the given state.
    Next(RitualState),
    /// The event is not valid in the current state; nothing changes.
    Rejected,
}

/// Pure transition table for rituals.
pub struct StateMachine;

impl StateMachine {
    /// Compute the transition for `event` in `state`.
    ///
    /// - Only `Idle` and `Failed` accept a submission.
    /// - `Severing` resolves to `Complete` or `Failed` and ignores resets.
    /// - `Failed` falls back to `Idle` when its timer fires.
    pub fn next(state: RitualState, event: RitualEvent) -> Transition {
        use RitualEvent::*;
        use RitualState::*;

        match (state, event) {
            (Idle | Failed, Submitted) => Transition::Next(Severing),
            (Severing, Severed) => Transition::Next(Complete),
            (Severing, SeverFailed) => Transition::Next(Failed),
            (Failed, TimedOut) => Transition::Next(Idle),
            (Idle | Complete | Failed, ResetRequested) => Transition::Next(Idle),
            _ => Transition::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_walks_all_states() {
        let t = StateMachine::next(RitualState::Idle, RitualEvent::Submitted);
        assert_eq!(t, Transition::Next(RitualState::Severing));

        let t = StateMachine::next(RitualState::Severing, RitualEvent::Severed);
        assert_eq!(t, Transition::Next(RitualState::Complete));

        let t = StateMachine::next(RitualState::Complete, RitualEvent::ResetRequested);
        assert_eq!(t, Transition::Next(RitualState::Idle));
    }

    #[test]
    fn failure_path_times_out_to_idle() {
        let t = StateMachine::next(RitualState::Severing, RitualEvent::SeverFailed);
        assert_eq!(t, Transition::Next(RitualState::Failed));

        let t = StateMachine::next(RitualState::Failed, RitualEvent::TimedOut);
        assert_eq!(t, Transition::Next(RitualState::Idle));
    }

    #[test]
    fn failed_accepts_a_new_submission() {
        let t = StateMachine::next(RitualState::Failed, RitualEvent::Submitted);
        assert_eq!(t, Transition::Next(RitualState::Severing));
    }

    #[test]
    fn submission_rejected_while_severing_or_complete() {
        for state in [RitualState::Severing, RitualState::Complete] {
            assert_eq!(
                StateMachine::next(state, RitualEvent::Submitted),
                Transition::Rejected
            );
            assert!(!state.accepts_input());
        }
        assert!(RitualState::Idle.accepts_input());
        assert!(RitualState::Failed.accepts_input());
    }

    #[test]
    fn reset_ignored_while_severing() {
        assert_eq!(
            StateMachine::next(RitualState::Severing, RitualEvent::ResetRequested),
            Transition::Rejected
        );
    }

    #[test]
    fn stale_timer_is_rejected_outside_failed() {
        for state in [RitualState::Idle, RitualState::Severing, RitualState::Complete] {
            assert_eq!(
                StateMachine::next(state, RitualEvent::TimedOut),
                Transition::Rejected
            );
        }
    }

    #[test]
    fn results_only_land_while_severing() {
        for state in [RitualState::Idle, RitualState::Complete, RitualState::Failed] {
            assert_eq!(StateMachine::next(state, RitualEvent::Severed), Transition::Rejected);
            assert_eq!(
                StateMachine::next(state, RitualEvent::SeverFailed),
                Transition::Rejected
            );
        }
    }

    #[test]
    fn state_display() {
        assert_eq!(RitualState::Idle.to_string(), "IDLE");
        assert_eq!(RitualState::Severing.to_string(), "SEVERING");
        assert_eq!(RitualState::Complete.to_string(), "COMPLETE");
        assert_eq!(RitualState::Failed.to_string(), "FAILED");
    }
}
