//! Rule and check traits
//!
//! Provides the [`Rule`] capability every strategy composes, and the narrower
//! [`Check`] predicate used as a decorator layer or chain node body.

use crate::decorator::Decorated;
use crate::error::RuleFault;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Outcome of a single evaluation
///
/// A failing verdict is a normal result, not an error. Malformed input is
/// reported separately as [`RuleFault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The plan satisfies the rule
    Pass,
    /// The plan is rejected by the rule
    Fail,
}

impl Verdict {
    /// Check if this is [`Verdict::Pass`]
    #[inline]
    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Check if this is [`Verdict::Fail`]
    #[inline]
    #[must_use]
    pub fn is_fail(self) -> bool {
        matches!(self, Self::Fail)
    }
}

impl From<bool> for Verdict {
    #[inline]
    fn from(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("PASS"),
            Self::Fail => f.write_str("FAIL"),
        }
    }
}

/// Atomic unit of validation
///
/// # Contract
/// - `evaluate` may be called repeatedly; only the most recent successful
///   call is eligible for `undo`.
/// - A rule returning [`Verdict::Fail`] commits no effect.
/// - `undo` on a rule that never successfully evaluated is a no-op, and a
///   second `undo` without an intervening successful `evaluate` is a no-op.
/// - `name` is for diagnostics only, never equality or ordering.
pub trait Rule<P: ?Sized>: Send + Sync + fmt::Debug {
    /// Diagnostic name
    fn name(&self) -> &str;

    /// Evaluate the plan
    ///
    /// # Returns
    /// - `Ok(Verdict)` for an accept/reject decision
    /// - `Err(RuleFault)` if the rule cannot interpret the plan
    fn evaluate(&self, plan: &P) -> Result<Verdict, RuleFault>;

    /// Reverse the effect of the most recent successful `evaluate`
    fn undo(&self) {}

    /// Forward link for chain nodes
    ///
    /// Introspection only: used to walk a chain and detect cycles.
    fn successor(&self) -> Option<Arc<dyn Rule<P>>> {
        None
    }

    /// Whether the rule at address `target` is this rule or is evaluated
    /// through it
    ///
    /// Wrappers and groups forward to every rule they hold, so a chain can
    /// refuse links that would loop back through them.
    fn reaches(&self, target: *const ()) -> bool {
        std::ptr::eq((self as *const Self).cast::<()>(), target)
    }
}

impl<P: ?Sized, R: Rule<P> + ?Sized> Rule<P> for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&self, plan: &P) -> Result<Verdict, RuleFault> {
        (**self).evaluate(plan)
    }

    fn undo(&self) {
        (**self).undo();
    }

    fn successor(&self) -> Option<Arc<dyn Rule<P>>> {
        (**self).successor()
    }

    fn reaches(&self, target: *const ()) -> bool {
        (**self).reaches(target)
    }
}

impl<P: ?Sized, R: Rule<P> + ?Sized> Rule<P> for Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&self, plan: &P) -> Result<Verdict, RuleFault> {
        (**self).evaluate(plan)
    }

    fn undo(&self) {
        (**self).undo();
    }

    fn successor(&self) -> Option<Arc<dyn Rule<P>>> {
        (**self).successor()
    }

    fn reaches(&self, target: *const ()) -> bool {
        (**self).reaches(target)
    }
}

/// Effect-free predicate
///
/// Decorator layers and chain node bodies are checks: they decide, they
/// never commit anything that would need undoing.
pub trait Check<P: ?Sized>: Send + Sync + fmt::Debug {
    /// Diagnostic name
    fn name(&self) -> &str;

    /// Decide whether the plan passes
    fn check(&self, plan: &P) -> Result<Verdict, RuleFault>;
}

impl<P: ?Sized, C: Check<P> + ?Sized> Check<P> for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn check(&self, plan: &P) -> Result<Verdict, RuleFault> {
        (**self).check(plan)
    }
}

impl<P: ?Sized, C: Check<P> + ?Sized> Check<P> for Arc<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn check(&self, plan: &P) -> Result<Verdict, RuleFault> {
        (**self).check(plan)
    }
}

/// Leaf rule backed by a [`Check`]
///
/// Has no effect of its own, so `undo` is a no-op.
#[derive(Debug, Clone)]
pub struct CheckRule<C> {
    check: C,
}

impl<C> CheckRule<C> {
    /// Wrap a check
    #[inline]
    #[must_use]
    pub fn new(check: C) -> Self {
        Self { check }
    }

    /// Borrow the wrapped check
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.check
    }
}

impl<P: ?Sized, C: Check<P>> Rule<P> for CheckRule<C> {
    fn name(&self) -> &str {
        self.check.name()
    }

    fn evaluate(&self, plan: &P) -> Result<Verdict, RuleFault> {
        let verdict = self.check.check(plan)?;
        tracing::debug!(rule = self.check.name(), %verdict, "check evaluated");
        Ok(verdict)
    }
}

/// Closure-backed check
pub struct FnCheck<F> {
    name: String,
    f: F,
}

impl<F> FnCheck<F> {
    /// Create a named check from a closure
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnCheck<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCheck").field("name", &self.name).finish()
    }
}

impl<P: ?Sized, F> Check<P> for FnCheck<F>
where
    F: Fn(&P) -> Result<Verdict, RuleFault> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, plan: &P) -> Result<Verdict, RuleFault> {
        (self.f)(plan)
    }
}

/// Fluent helpers available on every sized rule
pub trait RuleExt<P: ?Sized>: Rule<P> + Sized + 'static {
    /// Wrap this rule in a decorator layer
    ///
    /// `base.decorate(a).decorate(b)` evaluates `base`, then `a`, then `b`.
    fn decorate<C: Check<P> + 'static>(self, layer: C) -> Decorated<P> {
        Decorated::new(self, layer)
    }

    /// Box as a trait object
    fn boxed(self) -> Box<dyn Rule<P>> {
        Box::new(self)
    }

    /// Share as a trait object (chain successors are shared)
    fn shared(self) -> Arc<dyn Rule<P>> {
        Arc::new(self)
    }
}

impl<P: ?Sized, R: Rule<P> + 'static> RuleExt<P> for R {}
