//! Decorator stacking
//!
//! A [`Decorated`] rule wraps exactly one inner rule and adds one layer
//! check on top. The inner rule always runs first, so a stack built as
//! `C(B(A(base)))` evaluates `base`, `A`, `B`, `C` in that order.

use crate::error::{ConfigError, RuleFault};
use crate::rule::{Check, Rule, Verdict};
use std::fmt;

/// One decorator layer over an inner rule
///
/// The layer's own check never runs if the inner rule failed. When the
/// layer rejects a plan the inner rule passed, the inner rule is undone
/// before returning. `undo` cascades inward; the layer itself commits
/// nothing.
pub struct Decorated<P: ?Sized> {
    inner: Box<dyn Rule<P>>,
    layer: Box<dyn Check<P>>,
}

impl<P: ?Sized> Decorated<P> {
    /// Wrap `inner` with `layer`
    #[must_use]
    pub fn new<R, C>(inner: R, layer: C) -> Self
    where
        R: Rule<P> + 'static,
        C: Check<P> + 'static,
    {
        Self {
            inner: Box::new(inner),
            layer: Box::new(layer),
        }
    }

    /// Wrap this stack in another layer
    #[must_use]
    pub fn wrap<C: Check<P> + 'static>(self, layer: C) -> Self
    where
        P: 'static,
    {
        Self::new(self, layer)
    }

    /// The wrapped rule
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &dyn Rule<P> {
        self.inner.as_ref()
    }
}

impl<P: ?Sized> fmt::Debug for Decorated<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorated")
            .field("layer", &self.layer)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<P: ?Sized> Rule<P> for Decorated<P> {
    fn name(&self) -> &str {
        self.layer.name()
    }

    fn evaluate(&self, plan: &P) -> Result<Verdict, RuleFault> {
        if self.inner.evaluate(plan)?.is_fail() {
            tracing::debug!(layer = self.layer.name(), inner = self.inner.name(), "inner failed, layer skipped");
            return Ok(Verdict::Fail);
        }

        let verdict = self.layer.check(plan)?;
        tracing::debug!(layer = self.layer.name(), %verdict, "layer evaluated");
        if verdict.is_fail() {
            self.inner.undo();
        }
        Ok(verdict)
    }

    fn undo(&self) {
        self.inner.undo();
    }

    fn reaches(&self, target: *const ()) -> bool {
        std::ptr::eq((self as *const Self).cast::<()>(), target) || self.inner.reaches(target)
    }
}

/// Builds a decorator stack from a base rule and ordered layers
///
/// Layers are applied in the order given: the first layer wraps the base
/// directly and is therefore evaluated first after it.
pub struct DecoratorStack<P: ?Sized> {
    base: Option<Box<dyn Rule<P>>>,
    layers: Vec<Box<dyn Check<P>>>,
}

impl<P: ?Sized> fmt::Debug for DecoratorStack<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorStack")
            .field("base", &self.base)
            .field("layers", &self.layers)
            .finish()
    }
}

impl<P: ?Sized> Default for DecoratorStack<P> {
    fn default() -> Self {
        Self {
            base: None,
            layers: Vec::new(),
        }
    }
}

impl<P: ?Sized + 'static> DecoratorStack<P> {
    /// Create an empty stack
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base rule
    #[must_use]
    pub fn base<R: Rule<P> + 'static>(mut self, rule: R) -> Self {
        self.base = Some(Box::new(rule));
        self
    }

    /// Add the next layer
    #[must_use]
    pub fn layer<C: Check<P> + 'static>(mut self, check: C) -> Self {
        self.layers.push(Box::new(check));
        self
    }

    /// Number of layers added so far
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Assemble the stack
    ///
    /// # Errors
    /// [`ConfigError::MissingBase`] if no base rule was set.
    pub fn build(self) -> Result<Box<dyn Rule<P>>, ConfigError> {
        let base = self.base.ok_or(ConfigError::MissingBase)?;
        Ok(self
            .layers
            .into_iter()
            .fold(base, |inner, layer| -> Box<dyn Rule<P>> {
                Box::new(Decorated::new(inner, layer))
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::CompositeRule;
    use crate::rule::{CheckRule, RuleExt};
    use crate::testing::{Journal, Probe, ProbeCheck};
    use pretty_assertions::assert_eq;

    #[test]
    fn inner_runs_before_layer() {
        let journal = Journal::default();
        let rule = Decorated::<()>::new(
            Probe::pass("base", &journal),
            ProbeCheck::pass("a", &journal),
        );

        assert_eq!(rule.evaluate(&()).unwrap(), Verdict::Pass);
        assert_eq!(journal.evaluated(), vec!["base", "a"]);
        assert_eq!(Rule::<()>::name(&rule), "a");
    }

    #[test]
    fn stack_evaluates_innermost_first() {
        let journal = Journal::default();
        let rule = Decorated::<()>::new(Probe::pass("base", &journal), ProbeCheck::pass("a", &journal))
            .wrap(ProbeCheck::pass("b", &journal))
            .wrap(ProbeCheck::pass("c", &journal));

        assert_eq!(rule.evaluate(&()).unwrap(), Verdict::Pass);
        assert_eq!(journal.evaluated(), vec!["base", "a", "b", "c"]);
    }

    #[test]
    fn failing_layer_skips_outer_layers() {
        let journal = Journal::default();
        let rule = Decorated::<()>::new(Probe::pass("base", &journal), ProbeCheck::fail("a", &journal))
            .wrap(ProbeCheck::pass("b", &journal))
            .wrap(ProbeCheck::pass("c", &journal));

        assert_eq!(rule.evaluate(&()).unwrap(), Verdict::Fail);
        assert_eq!(journal.evaluated(), vec!["base", "a"]);
        assert_eq!(journal.undone(), vec!["base"]);
    }

    #[test]
    fn rejecting_layer_leaves_nothing_to_undo() {
        let journal = Journal::default();
        let rule = Decorated::<()>::new(
            CompositeRule::new("base")
                .with(Probe::pass("x", &journal))
                .with(Probe::pass("y", &journal)),
            ProbeCheck::fail("a", &journal),
        );

        assert_eq!(rule.evaluate(&()).unwrap(), Verdict::Fail);
        assert_eq!(journal.undone(), vec!["y", "x"]);

        rule.undo();
        assert_eq!(journal.undone(), vec!["y", "x"]);
    }

    #[test]
    fn failing_base_skips_all_layers() {
        let journal = Journal::default();
        let rule = Decorated::<()>::new(Probe::fail("base", &journal), ProbeCheck::pass("a", &journal));

        assert_eq!(rule.evaluate(&()).unwrap(), Verdict::Fail);
        assert_eq!(journal.evaluated(), vec!["base"]);
    }

    #[test]
    fn undo_cascades_to_base() {
        let journal = Journal::default();
        let rule = Decorated::<()>::new(Probe::pass("base", &journal), ProbeCheck::pass("a", &journal))
            .wrap(ProbeCheck::pass("b", &journal));

        rule.evaluate(&()).unwrap();
        rule.undo();
        assert_eq!(journal.undone(), vec!["base"]);
    }

    #[test]
    fn fluent_decorate_matches_wrap_order() {
        let journal = Journal::default();
        let rule: Decorated<()> = CheckRule::new(ProbeCheck::pass("base", &journal))
            .decorate(ProbeCheck::pass("a", &journal))
            .wrap(ProbeCheck::pass("b", &journal));

        assert_eq!(rule.evaluate(&()).unwrap(), Verdict::Pass);
        assert_eq!(journal.evaluated(), vec!["base", "a", "b"]);
    }

    #[test]
    fn stack_builder_applies_layers_in_order() {
        let journal = Journal::default();
        let rule = DecoratorStack::<()>::new()
            .base(Probe::pass("base", &journal))
            .layer(ProbeCheck::pass("a", &journal))
            .layer(ProbeCheck::pass("b", &journal))
            .build()
            .unwrap();

        assert_eq!(rule.evaluate(&()).unwrap(), Verdict::Pass);
        assert_eq!(journal.evaluated(), vec!["base", "a", "b"]);
    }

    #[test]
    fn stack_without_base_is_config_error() {
        let journal = Journal::default();
        let result = DecoratorStack::<()>::new()
            .layer(ProbeCheck::pass("a", &journal))
            .build();
        assert_eq!(result.unwrap_err(), ConfigError::MissingBase);
    }
}
