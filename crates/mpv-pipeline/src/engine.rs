//! Pipeline engine
//!
//! Runs a FIFO queue of rules against one plan, records every attempt, and
//! undoes committed rules in reverse on request.
//!
//! # Flow
//!
//! ```text
//! enqueue* ──> run_all ──┬─ Ok(true)   Completed ──┐
//!                        ├─ Ok(false)  Failed ─────┼─ undo_all ──> Idle
//!                        ├─ Deadline   Failed ─────┘
//!                        └─ RuleFault  Faulted ─── reset ──> Idle
//! ```

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::history::{EntryOutcome, HistoryEntry};
use crate::report::{RunId, RunOutcome, RunReport};
use crate::state::{validate_transition, PipelineState};
use mpv_rules::{ConfigError, Rule, Verdict};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Queue-based validation engine
///
/// # Invariants
/// - Rules are evaluated in enqueue order, at most once per run
/// - The first failing rule stops the run; later rules stay pending
/// - `undo_all` undoes only rules that passed, most recent first
/// - A fault never triggers undo; the caller decides via `undo` or `reset`
pub struct Pipeline<P: ?Sized> {
    config: PipelineConfig,
    state: PipelineState,
    pending: VecDeque<Box<dyn Rule<P>>>,
    history: Vec<HistoryEntry<P>>,
    last_report: Option<RunReport>,
}

impl<P: ?Sized> fmt::Debug for Pipeline<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.config.name)
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .field("history", &self.history)
            .finish()
    }
}

impl<P: ?Sized> Default for Pipeline<P> {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl<P: ?Sized> Pipeline<P> {
    /// Create an idle pipeline
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            state: PipelineState::Idle,
            pending: VecDeque::new(),
            history: Vec::new(),
            last_report: None,
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Number of rules waiting to run
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Attempted rules of the current run, in execution order
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry<P>] {
        &self.history
    }

    /// Report of the most recent run
    #[inline]
    #[must_use]
    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// Append a rule to the queue
    ///
    /// # Errors
    /// - [`ConfigError::InvalidState`] unless the pipeline is idle
    /// - [`ConfigError::CapacityExceeded`] if `max_pending` is reached
    pub fn enqueue<R: Rule<P> + 'static>(&mut self, rule: R) -> Result<(), ConfigError> {
        self.enqueue_boxed(Box::new(rule))
    }

    /// Append an already boxed rule to the queue
    ///
    /// # Errors
    /// See [`enqueue`](Self::enqueue).
    pub fn enqueue_boxed(&mut self, rule: Box<dyn Rule<P>>) -> Result<(), ConfigError> {
        self.require_idle("enqueue")?;

        if let Some(limit) = self.config.max_pending {
            if self.pending.len() >= limit {
                return Err(ConfigError::CapacityExceeded { limit });
            }
        }

        tracing::debug!(pipeline = %self.config.name, rule = rule.name(), "rule enqueued");
        self.pending.push_back(rule);
        Ok(())
    }

    /// Evaluate pending rules in order until one fails or the queue drains
    ///
    /// # Returns
    /// - `Ok(true)` if every pending rule passed
    /// - `Ok(false)` on the first failing rule
    ///
    /// # Errors
    /// - [`PipelineError::Config`] unless the pipeline is idle
    /// - [`PipelineError::RuleFault`] if a rule faulted
    /// - [`PipelineError::DeadlineExceeded`] if the deadline expired
    pub fn run_all(&mut self, plan: &P) -> Result<bool, PipelineError> {
        self.require_idle("run_all")?;
        self.transition(PipelineState::Running)?;
        self.history.clear();

        let run_id = RunId::new();
        let span = tracing::info_span!("pipeline_run", %run_id, pipeline = %self.config.name);
        let _enter = span.enter();

        tracing::info!(rules = self.pending.len(), "run started");
        let started = Instant::now();
        let deadline = self.config.deadline();

        while let Some(rule) = self.pending.pop_front() {
            if let Some(limit) = deadline {
                if started.elapsed() >= limit {
                    self.pending.push_front(rule);
                    return Err(self.expire(run_id, limit, started.elapsed()));
                }
            }

            match rule.evaluate(plan) {
                Ok(Verdict::Pass) => {
                    tracing::debug!(rule = rule.name(), "rule passed");
                    self.history.push(HistoryEntry::new(rule, EntryOutcome::Passed));
                }
                Ok(Verdict::Fail) => {
                    let name = rule.name().to_owned();
                    tracing::warn!(rule = %name, "rule failed");
                    self.history.push(HistoryEntry::new(rule, EntryOutcome::Failed));
                    self.transition(PipelineState::Failed)?;

                    let mut report =
                        self.report(run_id, RunOutcome::Rejected, Some(name), started.elapsed());
                    if self.config.auto_rollback {
                        report.rolled_back = self.undo_all()?;
                    }
                    self.last_report = Some(report);
                    return Ok(false);
                }
                Err(fault) => {
                    let name = rule.name().to_owned();
                    tracing::error!(rule = %name, %fault, "rule faulted");
                    self.history.push(HistoryEntry::new(rule, EntryOutcome::Faulted));
                    self.transition(PipelineState::Faulted)?;
                    self.last_report = Some(self.report(
                        run_id,
                        RunOutcome::Faulted,
                        Some(name.clone()),
                        started.elapsed(),
                    ));
                    return Err(PipelineError::RuleFault {
                        rule: name,
                        source: fault,
                    });
                }
            }
        }

        self.transition(PipelineState::Completed)?;
        let elapsed = started.elapsed();
        tracing::info!(evaluated = self.history.len(), ?elapsed, "run completed");
        self.last_report = Some(self.report(run_id, RunOutcome::Approved, None, elapsed));
        Ok(true)
    }

    /// Undo every rule that passed in the last run, most recent first
    ///
    /// Consumes the history and returns the pipeline to idle.
    ///
    /// # Errors
    /// - [`ConfigError::NothingToUndo`] if idle
    /// - [`ConfigError::InvalidState`] while faulted or running
    pub fn undo_all(&mut self) -> Result<usize, PipelineError> {
        match self.state {
            PipelineState::Completed | PipelineState::Failed => {}
            PipelineState::Idle => return Err(ConfigError::NothingToUndo.into()),
            other => {
                return Err(ConfigError::InvalidState {
                    operation: "undo_all",
                    state: other.as_str(),
                }
                .into())
            }
        }

        self.transition(PipelineState::UndoPhase)?;
        let mut undone = 0;
        while let Some(entry) = self.history.pop() {
            if entry.undo() {
                tracing::debug!(rule = entry.name(), "rule undone");
                undone += 1;
            }
        }
        self.transition(PipelineState::Idle)?;

        tracing::info!(pipeline = %self.config.name, undone, "undo complete");
        Ok(undone)
    }

    /// Discard history and pending rules without undoing anything
    ///
    /// The only way out of [`PipelineState::Faulted`].
    ///
    /// # Errors
    /// [`ConfigError::IllegalTransition`] if called mid-run or mid-undo.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        if self.state != PipelineState::Idle {
            self.transition(PipelineState::Idle)?;
        }
        let discarded = self.history.len() + self.pending.len();
        self.history.clear();
        self.pending.clear();
        tracing::debug!(pipeline = %self.config.name, discarded, "pipeline reset");
        Ok(())
    }

    fn require_idle(&self, operation: &'static str) -> Result<(), ConfigError> {
        if self.state == PipelineState::Idle {
            Ok(())
        } else {
            Err(ConfigError::InvalidState {
                operation,
                state: self.state.as_str(),
            })
        }
    }

    fn transition(&mut self, to: PipelineState) -> Result<(), ConfigError> {
        validate_transition(self.state, to)?;
        tracing::trace!(from = %self.state, %to, "state transition");
        self.state = to;
        Ok(())
    }

    fn expire(&mut self, run_id: RunId, limit: Duration, elapsed: Duration) -> PipelineError {
        let deadline_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
        let evaluated = self.history.len();
        tracing::warn!(deadline_ms, evaluated, "run deadline exceeded");

        if let Err(err) = self.transition(PipelineState::Failed) {
            return err.into();
        }
        self.last_report = Some(self.report(run_id, RunOutcome::DeadlineExceeded, None, elapsed));
        PipelineError::DeadlineExceeded {
            deadline_ms,
            evaluated,
        }
    }

    fn report(
        &self,
        run_id: RunId,
        outcome: RunOutcome,
        failed_rule: Option<String>,
        elapsed: Duration,
    ) -> RunReport {
        RunReport {
            run_id,
            pipeline: self.config.name.clone(),
            outcome,
            evaluated: self.history.iter().map(|e| e.name().to_owned()).collect(),
            failed_rule,
            remaining: self.pending.len(),
            rolled_back: 0,
            elapsed,
        }
    }
}
