//! Pipeline error types

use mpv_rules::{ConfigError, RuleFault};

/// Errors surfaced by the pipeline engine
///
/// A rejected plan is not an error: `run_all` returns `Ok(false)`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// Engine misuse or illegal transition
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A rule could not interpret the plan
    #[error("rule `{rule}` faulted: {source}")]
    RuleFault {
        /// Name of the faulting rule
        rule: String,
        /// Underlying fault
        source: RuleFault,
    },

    /// The run deadline expired between rules
    #[error("deadline of {deadline_ms}ms exceeded after {evaluated} rules")]
    DeadlineExceeded {
        /// Configured deadline
        deadline_ms: u64,
        /// Rules evaluated before expiry
        evaluated: usize,
    },
}

impl PipelineError {
    /// Check if a rule malfunctioned
    #[inline]
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::RuleFault { .. })
    }

    /// Check if the engine was misused
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if the run ran out of time
    #[inline]
    #[must_use]
    pub fn is_deadline(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let config: PipelineError = ConfigError::NothingToUndo.into();
        assert!(config.is_configuration());
        assert!(!config.is_fault());

        let fault = PipelineError::RuleFault {
            rule: "power".to_owned(),
            source: RuleFault::malformed("power", "negative"),
        };
        assert!(fault.is_fault());
        assert!(fault.to_string().starts_with("rule `power` faulted"));

        let late = PipelineError::DeadlineExceeded {
            deadline_ms: 10,
            evaluated: 2,
        };
        assert!(late.is_deadline());
        assert_eq!(late.to_string(), "deadline of 10ms exceeded after 2 rules");
    }
}
