//! Execution history

use mpv_rules::Rule;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an attempted rule ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Evaluated to pass; eligible for undo
    Passed,
    /// Evaluated to fail; never undone
    Failed,
    /// Raised a fault; never undone
    Faulted,
}

/// One attempted rule, kept for undo
pub struct HistoryEntry<P: ?Sized> {
    rule: Box<dyn Rule<P>>,
    outcome: EntryOutcome,
}

impl<P: ?Sized> HistoryEntry<P> {
    pub(crate) fn new(rule: Box<dyn Rule<P>>, outcome: EntryOutcome) -> Self {
        Self { rule, outcome }
    }

    /// Rule name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.rule.name()
    }

    /// Evaluation outcome
    #[inline]
    #[must_use]
    pub fn outcome(&self) -> EntryOutcome {
        self.outcome
    }

    /// Undo the rule if it passed; returns whether it was undone
    pub(crate) fn undo(&self) -> bool {
        if self.outcome == EntryOutcome::Passed {
            self.rule.undo();
            true
        } else {
            false
        }
    }
}

impl<P: ?Sized> fmt::Debug for HistoryEntry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("rule", &self.rule.name())
            .field("outcome", &self.outcome)
            .finish()
    }
}
