//! Pipeline state machine
//!
//! ```text
//! Idle ──> Running ──┬──> Completed ──┐
//!  ^                 ├──> Failed ─────┼──> UndoPhase ──> Idle
//!  │                 └──> Faulted     │
//!  └──────── reset ───────────────────┘
//! ```

use mpv_rules::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Accepting rules
    Idle,
    /// Evaluating the queue
    Running,
    /// Every rule passed
    Completed,
    /// A rule failed or the deadline expired
    Failed,
    /// Undoing history
    UndoPhase,
    /// A rule faulted; only `reset` leaves this state
    Faulted,
}

impl PipelineState {
    /// Every state, in declaration order
    pub const ALL: [Self; 6] = [
        Self::Idle,
        Self::Running,
        Self::Completed,
        Self::Failed,
        Self::UndoPhase,
        Self::Faulted,
    ];

    /// Lower-case state name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::UndoPhase => "undo_phase",
            Self::Faulted => "faulted",
        }
    }

    /// Check if a run has finished and not yet been cleared
    #[inline]
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Faulted)
    }
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: PipelineState) -> Vec<PipelineState> {
    use PipelineState::{Completed, Failed, Faulted, Idle, Running, UndoPhase};
    match from {
        Idle => vec![Running],
        Running => vec![Completed, Failed, Faulted],
        Completed | Failed => vec![UndoPhase, Idle],
        UndoPhase | Faulted => vec![Idle],
    }
}

/// Validate a state transition
///
/// # Errors
/// [`ConfigError::IllegalTransition`] if `to` is not reachable from `from`.
pub fn validate_transition(from: PipelineState, to: PipelineState) -> Result<(), ConfigError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(ConfigError::IllegalTransition {
            from: from.as_str(),
            to: to.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_self_transitions() {
        for state in PipelineState::ALL {
            assert!(validate_transition(state, state).is_err(), "{state}");
        }
    }

    #[test]
    fn faulted_only_resets() {
        assert_eq!(
            allowed_transitions(PipelineState::Faulted),
            vec![PipelineState::Idle]
        );
    }

    #[test]
    fn serde_names_match_display() {
        for state in PipelineState::ALL {
            let json = format!("\"{state}\"");
            let parsed: PipelineState = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, state);
        }
    }
}
