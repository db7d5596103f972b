//! Rule aggregator
//!
//! Collects rules and runs them in registration order behind a single
//! `validate_all` call. Has no undo and no state machine; callers that need
//! rollback use the pipeline engine instead.

use crate::error::RuleFault;
use crate::rule::{Rule, Verdict};
use std::fmt;

/// Registration-ordered collection of rules
pub struct RuleAggregator<P: ?Sized> {
    rules: Vec<Box<dyn Rule<P>>>,
}

impl<P: ?Sized> fmt::Debug for RuleAggregator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleAggregator")
            .field("rules", &self.rules)
            .finish()
    }
}

impl<P: ?Sized> Default for RuleAggregator<P> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<P: ?Sized> RuleAggregator<P> {
    /// Create an empty aggregator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a pre-built collection, keeping its order
    #[must_use]
    pub fn from_rules(rules: impl IntoIterator<Item = Box<dyn Rule<P>>>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Register a rule after those already present
    pub fn register<R: Rule<P> + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    /// Number of registered rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no rules are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule until one fails
    ///
    /// # Errors
    /// The first [`RuleFault`] raised; later rules are not evaluated.
    pub fn validate_all(&self, plan: &P) -> Result<bool, RuleFault> {
        for rule in &self.rules {
            match rule.evaluate(plan) {
                Ok(Verdict::Pass) => {}
                Ok(Verdict::Fail) => {
                    tracing::warn!(rule = rule.name(), "validation failed");
                    return Ok(false);
                }
                Err(fault) => {
                    tracing::error!(rule = rule.name(), %fault, "rule faulted");
                    return Err(fault);
                }
            }
        }

        tracing::info!(rules = self.rules.len(), "all rules passed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Journal, Probe};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_aggregator_passes() {
        assert!(RuleAggregator::<()>::new().validate_all(&()).unwrap());
    }

    #[test]
    fn registration_order_and_fail_fast() {
        let journal = Journal::default();
        let mut aggregator = RuleAggregator::<()>::new();
        aggregator.register(Probe::pass("a", &journal));
        aggregator.register(Probe::fail("b", &journal));
        aggregator.register(Probe::pass("c", &journal));

        assert!(!aggregator.validate_all(&()).unwrap());
        assert_eq!(journal.evaluated(), vec!["a", "b"]);
    }

    #[test]
    fn never_undoes() {
        let journal = Journal::default();
        let mut aggregator = RuleAggregator::<()>::new();
        aggregator.register(Probe::pass("a", &journal));
        aggregator.register(Probe::fail("b", &journal));

        aggregator.validate_all(&()).unwrap();
        assert!(journal.undone().is_empty());
    }

    #[test]
    fn from_rules_keeps_order() {
        let journal = Journal::default();
        let rules: Vec<Box<dyn Rule<()>>> = vec![
            Box::new(Probe::pass("first", &journal)),
            Box::new(Probe::pass("second", &journal)),
        ];
        let aggregator = RuleAggregator::from_rules(rules);

        assert_eq!(aggregator.len(), 2);
        assert!(aggregator.validate_all(&()).unwrap());
        assert_eq!(journal.evaluated(), vec!["first", "second"]);
    }

    #[test]
    fn fault_surfaces() {
        let journal = Journal::default();
        let mut aggregator = RuleAggregator::<()>::new();
        aggregator.register(Probe::fault("broken", &journal));
        aggregator.register(Probe::pass("after", &journal));

        assert!(aggregator.validate_all(&()).is_err());
        assert_eq!(journal.evaluated(), vec!["broken"]);
    }
}
