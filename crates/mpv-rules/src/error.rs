//! Error types for rules and rule assembly
//!
//! Provides error handling for:
//! - Rules that cannot interpret a plan ([`RuleFault`])
//! - Invalid assembly or engine usage ([`ConfigError`])
//!
//! A rejected plan is neither: it is `Ok(Verdict::Fail)`.

use mpv_plan::PlanError;

/// A rule malfunctioned
///
/// Distinct from a failing verdict so callers can tell "mission rejected"
/// apart from "validator malfunctioned". Never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleFault {
    /// The plan is missing a field or carries an unusable value
    #[error("malformed plan: {0}")]
    Plan(#[from] PlanError),

    /// Rule-specific malfunction
    #[error("rule `{rule}` malfunctioned: {reason}")]
    Malformed {
        /// Rule name
        rule: String,
        /// Human-readable reason
        reason: String,
    },
}

impl RuleFault {
    /// Create a rule-specific fault
    #[inline]
    #[must_use]
    pub fn malformed(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

/// Programmer error in assembling rules or driving the engine
///
/// Signalled immediately, never ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Operation not allowed in the engine's current state
    #[error("`{operation}` is not allowed while {state}")]
    InvalidState {
        /// Attempted operation
        operation: &'static str,
        /// Engine state name
        state: &'static str,
    },

    /// State machine rejected a transition
    #[error("illegal state transition: {from} -> {to}")]
    IllegalTransition {
        /// Source state name
        from: &'static str,
        /// Target state name
        to: &'static str,
    },

    /// Undo requested but nothing has run
    #[error("nothing to undo: no rules have executed")]
    NothingToUndo,

    /// Pending queue is full
    #[error("pending queue is full (max: {limit})")]
    CapacityExceeded {
        /// Configured queue limit
        limit: usize,
    },

    /// Linking would make a chain reach itself
    #[error("linking `{node}` would create a cycle")]
    ChainCycle {
        /// Node being linked
        node: String,
    },

    /// A chain needs at least one node
    #[error("chain has no nodes")]
    EmptyChain,

    /// A decorator stack needs a base rule to wrap
    #[error("decorator stack has no base rule")]
    MissingBase,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpv_plan::PlanField;

    #[test]
    fn plan_error_converts() {
        let fault: RuleFault = PlanError::MissingField(PlanField::Altitude).into();
        assert!(matches!(fault, RuleFault::Plan(_)));
        assert!(fault.to_string().contains("altitude"));
    }

    #[test]
    fn malformed_display() {
        let fault = RuleFault::malformed("power", "negative draw");
        assert_eq!(
            fault.to_string(),
            "rule `power` malfunctioned: negative draw"
        );
    }

    #[test]
    fn invalid_state_display() {
        let err = ConfigError::InvalidState {
            operation: "enqueue",
            state: "running",
        };
        assert_eq!(err.to_string(), "`enqueue` is not allowed while running");
    }
}
