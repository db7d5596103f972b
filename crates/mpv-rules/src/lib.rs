//! MPV Rules
//!
//! Composable validation rules with short-circuit evaluation and
//! symmetric rollback.
//!
//! # Core Concepts
//!
//! - [`Rule`]: Atomic unit of validation (evaluate, undo, name)
//! - [`Check`]: Effect-free predicate used as a decorator layer or chain node
//! - [`Verdict`]: Pass/fail decision; malformed input is a [`RuleFault`] instead
//! - [`CompositeRule`]: Ordered group with one verdict and one undo
//! - [`Decorated`] / [`DecoratorStack`]: Inner rule first, then the layer
//! - [`ChainNode`] / [`ChainBuilder`]: Own check first, then the successor
//! - [`RuleAggregator`]: Registration-ordered collection, fail-fast, no undo
//! - [`catalog`]: Mission checks and satellite-effect rules
//!
//! # Ordering
//!
//! ```text
//! Decorated C(B(A(base)))   base -> A -> B -> C
//! Chain     X -> Y -> Z     X -> Y -> Z
//! ```
//!
//! Both stop at the first failure; they differ in whether the wrapper's own
//! check runs before or after what it wraps.
//!
//! # Example
//!
//! ```rust,ignore
//! use mpv_rules::{catalog::MissionLimits, CompositeRule, CheckRule, Rule};
//!
//! let limits = MissionLimits::default();
//! let group = CompositeRule::new("mission")
//!     .with(CheckRule::new(limits.time_window()))
//!     .with(CheckRule::new(limits.altitude()))
//!     .with(CheckRule::new(limits.power()));
//!
//! assert!(group.evaluate(&plan)?.is_pass());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod aggregator;
pub mod catalog;
mod chain;
mod composite;
mod decorator;
mod error;
mod rule;

#[cfg(test)]
mod testing;

// Re-exports
pub use aggregator::RuleAggregator;
pub use chain::{ChainBuilder, ChainNode};
pub use composite::CompositeRule;
pub use decorator::{Decorated, DecoratorStack};
pub use error::{ConfigError, RuleFault};
pub use rule::{Check, CheckRule, FnCheck, Rule, RuleExt, Verdict};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
