use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// One of the six ordered reconciliation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Members,
    Attendees,
    Messages,
    Points,
    Practices,
    Quiz,
}

impl Phase {
    /// All phases in execution order.
    pub fn all() -> &'static [Phase] {
        &[
            Phase::Members,
            Phase::Attendees,
            Phase::Messages,
            Phase::Points,
            Phase::Practices,
            Phase::Quiz,
        ]
    }

    /// 1-based position in the run.
    pub fn ordinal(self) -> u8 {
        match self {
            Phase::Members => 1,
            Phase::Attendees => 2,
            Phase::Messages => 3,
            Phase::Points => 4,
            Phase::Practices => 5,
            Phase::Quiz => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Members => "members",
            Phase::Attendees => "attendees",
            Phase::Messages => "messages",
            Phase::Points => "points",
            Phase::Practices => "practices",
            Phase::Quiz => "quiz",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// Lifecycle of a single run.
///
/// Transitions: `NotStarted → Running(Members) → … → Running(Quiz) → Completed`,
/// or `Running(p) → Aborted(p)`. There is no retry or rollback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    NotStarted,
    Running(Phase),
    Completed,
    Aborted(Phase),
}

impl RunState {
    pub(crate) fn enter(self, phase: Phase) -> Self {
        debug_assert!(match self {
            RunState::NotStarted => phase == Phase::Members,
            RunState::Running(prev) => prev.ordinal() + 1 == phase.ordinal(),
            _ => false,
        });
        RunState::Running(phase)
    }

    pub(crate) fn abort(self) -> Self {
        match self {
            RunState::Running(phase) => RunState::Aborted(phase),
            other => other,
        }
    }

    pub(crate) fn complete(self) -> Self {
        match self {
            RunState::Running(Phase::Quiz) => RunState::Completed,
            other => other,
        }
    }

    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Aborted(_))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::NotStarted => f.write_str("not_started"),
            RunState::Running(p) => write!(f, "running:{p}"),
            RunState::Completed => f.write_str("completed"),
            RunState::Aborted(p) => write!(f, "aborted:{p}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        let ordinals: Vec<u8> = Phase::all().iter().map(|p| p.ordinal()).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn full_walk_completes() {
        let mut state = RunState::NotStarted;
        for phase in Phase::all() {
            state = state.enter(*phase);
        }
        assert_eq!(state.complete(), RunState::Completed);
        assert!(RunState::Completed.is_terminal());
    }

    #[test]
    fn abort_keeps_phase() {
        let state = RunState::NotStarted
            .enter(Phase::Members)
            .enter(Phase::Attendees)
            .abort();
        assert_eq!(state, RunState::Aborted(Phase::Attendees));
        assert_eq!(state.to_string(), "aborted:attendees");
        assert!(state.is_terminal());
    }

    #[test]
    fn complete_before_last_phase_is_a_no_op() {
        let state = RunState::NotStarted.enter(Phase::Members).complete();
        assert_eq!(state, RunState::Running(Phase::Members));
    }
}
