//! Composite rule
//!
//! An ordered group of child rules evaluated as one unit, with one verdict
//! and one undo for the whole group.

use crate::error::RuleFault;
use crate::rule::{Rule, Verdict};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Ordered group of rules
///
/// # Characteristics
/// - Children run strictly in insertion order
/// - Fail-fast: the first failing child stops the group
/// - A failing group rolls back its passed children before returning, so
///   it commits nothing
/// - `undo` reverses only the children that passed, last first
/// - Empty groups pass
///
/// Composites own their children and nest freely.
pub struct CompositeRule<P: ?Sized> {
    name: String,
    children: Vec<Box<dyn Rule<P>>>,
    // Children committed by the most recent evaluate; cleared by undo.
    passed: AtomicUsize,
}

impl<P: ?Sized> CompositeRule<P> {
    /// Create an empty composite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            passed: AtomicUsize::new(0),
        }
    }

    /// Append a child rule
    pub fn add<R: Rule<P> + 'static>(&mut self, child: R) {
        self.children.push(Box::new(child));
    }

    /// Builder-style [`add`](Self::add)
    #[must_use]
    pub fn with<R: Rule<P> + 'static>(mut self, child: R) -> Self {
        self.add(child);
        self
    }

    /// Number of children
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if the composite has no children
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children that passed in the most recent evaluation
    #[inline]
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.passed.load(Ordering::Acquire)
    }
}

impl<P: ?Sized> fmt::Debug for CompositeRule<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeRule")
            .field("name", &self.name)
            .field("children", &self.children)
            .field("passed", &self.passed_count())
            .finish()
    }
}

impl<P: ?Sized> Rule<P> for CompositeRule<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, plan: &P) -> Result<Verdict, RuleFault> {
        tracing::debug!(composite = %self.name, children = self.children.len(), "composite started");

        let mut passed = 0;
        let mut verdict = Verdict::Pass;

        for child in &self.children {
            match child.evaluate(plan) {
                Ok(Verdict::Pass) => {
                    tracing::debug!(composite = %self.name, child = child.name(), "child passed");
                    passed += 1;
                }
                Ok(Verdict::Fail) => {
                    tracing::debug!(composite = %self.name, child = child.name(), "child failed");
                    verdict = Verdict::Fail;
                    break;
                }
                Err(fault) => {
                    tracing::error!(composite = %self.name, child = child.name(), %fault, "child faulted");
                    self.passed.store(passed, Ordering::Release);
                    return Err(fault);
                }
            }
        }

        if verdict.is_fail() {
            tracing::debug!(composite = %self.name, passed, "rolling back passed children");
            self.rollback(passed);
            self.passed.store(0, Ordering::Release);
        } else {
            self.passed.store(passed, Ordering::Release);
        }
        tracing::debug!(composite = %self.name, %verdict, "composite finished");
        Ok(verdict)
    }

    fn undo(&self) {
        let passed = self.passed.swap(0, Ordering::AcqRel);
        if passed > 0 {
            tracing::debug!(composite = %self.name, passed, "undoing composite");
        }
        self.rollback(passed);
    }

    fn reaches(&self, target: *const ()) -> bool {
        std::ptr::eq((self as *const Self).cast::<()>(), target)
            || self.children.iter().any(|child| child.reaches(target))
    }
}

impl<P: ?Sized> CompositeRule<P> {
    fn rollback(&self, passed: usize) {
        for child in self.children[..passed].iter().rev() {
            child.undo();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Journal, Probe};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_composite_passes() {
        let composite = CompositeRule::<()>::new("empty");
        assert!(composite.is_empty());
        assert_eq!(composite.evaluate(&()).unwrap(), Verdict::Pass);
    }

    #[test]
    fn runs_children_in_order() {
        let journal = Journal::default();
        let composite = CompositeRule::<()>::new("group")
            .with(Probe::pass("a", &journal))
            .with(Probe::pass("b", &journal))
            .with(Probe::pass("c", &journal));

        assert_eq!(composite.evaluate(&()).unwrap(), Verdict::Pass);
        assert_eq!(journal.evaluated(), vec!["a", "b", "c"]);
        assert_eq!(composite.passed_count(), 3);
    }

    #[test]
    fn stops_at_first_failure() {
        let journal = Journal::default();
        let composite = CompositeRule::<()>::new("group")
            .with(Probe::pass("a", &journal))
            .with(Probe::fail("b", &journal))
            .with(Probe::pass("c", &journal));

        assert_eq!(composite.evaluate(&()).unwrap(), Verdict::Fail);
        assert_eq!(journal.evaluated(), vec!["a", "b"]);
        assert_eq!(composite.passed_count(), 0);
    }

    #[test]
    fn failure_rolls_back_passed_children() {
        let journal = Journal::default();
        let composite = CompositeRule::<()>::new("group")
            .with(Probe::pass("a", &journal))
            .with(Probe::pass("b", &journal))
            .with(Probe::fail("c", &journal))
            .with(Probe::pass("d", &journal));

        assert_eq!(composite.evaluate(&()).unwrap(), Verdict::Fail);
        assert_eq!(journal.undone(), vec!["b", "a"]);

        // Nothing left committed for a later undo.
        composite.undo();
        assert_eq!(journal.undone(), vec!["b", "a"]);
    }

    #[test]
    fn undo_after_pass_reverses_every_child() {
        let journal = Journal::default();
        let composite = CompositeRule::<()>::new("group")
            .with(Probe::pass("a", &journal))
            .with(Probe::pass("b", &journal));

        composite.evaluate(&()).unwrap();
        composite.undo();
        assert_eq!(journal.undone(), vec!["b", "a"]);
    }

    #[test]
    fn second_undo_is_noop() {
        let journal = Journal::default();
        let composite = CompositeRule::<()>::new("group").with(Probe::pass("a", &journal));

        composite.evaluate(&()).unwrap();
        composite.undo();
        composite.undo();
        assert_eq!(journal.undone(), vec!["a"]);
    }

    #[test]
    fn undo_before_evaluate_is_noop() {
        let journal = Journal::default();
        let composite = CompositeRule::<()>::new("group").with(Probe::pass("a", &journal));
        composite.undo();
        assert!(journal.undone().is_empty());
    }

    #[test]
    fn fault_propagates_and_keeps_passed_count() {
        let journal = Journal::default();
        let composite = CompositeRule::<()>::new("group")
            .with(Probe::pass("a", &journal))
            .with(Probe::fault("b", &journal))
            .with(Probe::pass("c", &journal));

        assert!(composite.evaluate(&()).is_err());
        assert_eq!(journal.evaluated(), vec!["a", "b"]);
        assert_eq!(composite.passed_count(), 1);
    }

    #[test]
    fn nested_composites_undo_inside_out() {
        let journal = Journal::default();
        let inner = CompositeRule::<()>::new("inner")
            .with(Probe::pass("b", &journal))
            .with(Probe::pass("c", &journal));
        let outer = CompositeRule::<()>::new("outer")
            .with(Probe::pass("a", &journal))
            .with(inner)
            .with(Probe::pass("d", &journal));

        assert_eq!(outer.evaluate(&()).unwrap(), Verdict::Pass);
        assert_eq!(journal.evaluated(), vec!["a", "b", "c", "d"]);

        outer.undo();
        assert_eq!(journal.undone(), vec!["d", "c", "b", "a"]);
    }
}
