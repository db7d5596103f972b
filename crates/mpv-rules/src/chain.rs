//! Chain of responsibility
//!
//! Each [`ChainNode`] runs its own check first and only then forwards to an
//! explicit successor. This is the opposite ordering to
//! [`Decorated`](crate::Decorated), which runs its inner rule first.

use crate::error::{ConfigError, RuleFault};
use crate::rule::{Check, Rule, Verdict};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// One link in a validation chain
///
/// The successor is shared, not owned: several chains may end in the same
/// tail. Linking is checked so a chain can never reach itself.
pub struct ChainNode<P: ?Sized> {
    check: Box<dyn Check<P>>,
    next: RwLock<Option<Arc<dyn Rule<P>>>>,
}

impl<P: ?Sized> fmt::Debug for ChainNode<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let next = self.next.read().as_ref().map(|n| n.name().to_owned());
        f.debug_struct("ChainNode")
            .field("check", &self.check)
            .field("next", &next)
            .finish()
    }
}

impl<P: ?Sized + 'static> ChainNode<P> {
    /// Create an unlinked node
    #[must_use]
    pub fn new<C: Check<P> + 'static>(check: C) -> Self {
        Self {
            check: Box::new(check),
            next: RwLock::new(None),
        }
    }

    /// Create an unlinked node, already shared
    #[must_use]
    pub fn shared<C: Check<P> + 'static>(check: C) -> Arc<Self> {
        Arc::new(Self::new(check))
    }

    /// Replace the successor
    ///
    /// # Errors
    /// [`ConfigError::ChainCycle`] if `next`, or anything reachable from it,
    /// is this node.
    pub fn set_next(&self, next: Arc<dyn Rule<P>>) -> Result<(), ConfigError> {
        if self.reaches_self(&next) {
            return Err(ConfigError::ChainCycle {
                node: self.check.name().to_owned(),
            });
        }

        tracing::debug!(node = self.check.name(), next = next.name(), "chain linked");
        *self.next.write() = Some(next);
        Ok(())
    }

    /// Detach the successor, returning it
    pub fn clear_next(&self) -> Option<Arc<dyn Rule<P>>> {
        self.next.write().take()
    }

    fn reaches_self(&self, start: &Arc<dyn Rule<P>>) -> bool {
        start.reaches((self as *const Self).cast::<()>())
    }
}

impl<P: ?Sized> Rule<P> for ChainNode<P> {
    fn name(&self) -> &str {
        self.check.name()
    }

    fn evaluate(&self, plan: &P) -> Result<Verdict, RuleFault> {
        let verdict = self.check.check(plan)?;
        tracing::debug!(node = self.check.name(), %verdict, "chain node checked");
        if verdict.is_fail() {
            return Ok(Verdict::Fail);
        }

        // Clone out of the lock so a successor may relink this node.
        let next = self.next.read().clone();
        match next {
            Some(next) => next.evaluate(plan),
            None => Ok(Verdict::Pass),
        }
    }

    fn undo(&self) {
        let next = self.next.read().clone();
        if let Some(next) = next {
            next.undo();
        }
    }

    fn successor(&self) -> Option<Arc<dyn Rule<P>>> {
        self.next.read().clone()
    }

    fn reaches(&self, target: *const ()) -> bool {
        if std::ptr::eq((self as *const Self).cast::<()>(), target) {
            return true;
        }
        let next = self.next.read().clone();
        next.is_some_and(|next| next.reaches(target))
    }
}

/// Links checks front to back into a chain
///
/// ```text
/// ChainBuilder::new().link(x).link(y).link(z).build()  =>  x -> y -> z
/// ```
pub struct ChainBuilder<P: ?Sized> {
    checks: Vec<Box<dyn Check<P>>>,
}

impl<P: ?Sized> fmt::Debug for ChainBuilder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("checks", &self.checks)
            .finish()
    }
}

impl<P: ?Sized> Default for ChainBuilder<P> {
    fn default() -> Self {
        Self { checks: Vec::new() }
    }
}

impl<P: ?Sized + 'static> ChainBuilder<P> {
    /// Create an empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node
    #[must_use]
    pub fn link<C: Check<P> + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Build the chain and return its head
    ///
    /// # Errors
    /// [`ConfigError::EmptyChain`] if no checks were linked.
    pub fn build(self) -> Result<Arc<ChainNode<P>>, ConfigError> {
        let mut next: Option<Arc<dyn Rule<P>>> = None;
        let mut head = None;

        for check in self.checks.into_iter().rev() {
            let node = Arc::new(ChainNode {
                check,
                next: RwLock::new(next.take()),
            });
            next = Some(Arc::clone(&node) as Arc<dyn Rule<P>>);
            head = Some(node);
        }

        head.ok_or(ConfigError::EmptyChain)
    }
}
