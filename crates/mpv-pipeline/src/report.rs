//! Run identifiers and reports

use serde::{Deserialize, Serialize};
use std::time::Duration;
use ulid::Ulid;

/// Unique run identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every rule passed
    Approved,
    /// A rule failed
    Rejected,
    /// A rule faulted
    Faulted,
    /// The deadline expired between rules
    DeadlineExceeded,
}

impl RunOutcome {
    /// Check if the plan was approved
    #[inline]
    #[must_use]
    pub fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier
    pub run_id: RunId,
    /// Pipeline name from the configuration
    pub pipeline: String,
    /// Final outcome
    pub outcome: RunOutcome,
    /// Names of attempted rules, in execution order
    pub evaluated: Vec<String>,
    /// Rule that failed or faulted, if any
    pub failed_rule: Option<String>,
    /// Rules still pending after the run
    pub remaining: usize,
    /// Rules undone by automatic rollback
    pub rolled_back: usize,
    /// Wall-clock time spent in the run
    pub elapsed: Duration,
}
