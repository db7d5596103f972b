//! Testing utilities for MPV workspace
//!
//! Recording probe rules, a shared journal, and plan fixtures.

#![allow(missing_docs)]

use chrono::{NaiveDate, NaiveDateTime};
use mpv_plan::MissionPlan;
use mpv_rules::{Check, Rule, RuleFault, Verdict};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Evaluated(String),
    Checked(String),
    Undone(String),
}

/// Shared, ordered record of probe calls
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Journal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: Event) {
        self.events.lock().push(event);
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Names of every evaluated rule or check, in call order
    #[must_use]
    pub fn evaluated(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Evaluated(name) | Event::Checked(name) => Some(name.clone()),
                Event::Undone(_) => None,
            })
            .collect()
    }

    /// Names of every undone rule, in call order
    #[must_use]
    pub fn undone(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Undone(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

/// What a probe returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Pass,
    Fail,
    Fault,
}

impl ProbeOutcome {
    fn result(self, name: &str) -> Result<Verdict, RuleFault> {
        match self {
            Self::Pass => Ok(Verdict::Pass),
            Self::Fail => Ok(Verdict::Fail),
            Self::Fault => Err(RuleFault::malformed(name, "probe fault")),
        }
    }
}

impl From<bool> for ProbeOutcome {
    fn from(passes: bool) -> Self {
        if passes {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

/// Rule that records every call and returns a fixed outcome
///
/// Records every `undo` call, including ones the contract says should be
/// no-ops, so tests can catch an engine undoing the wrong rule.
#[derive(Debug)]
pub struct ProbeRule {
    name: String,
    outcome: ProbeOutcome,
    delay: Option<Duration>,
    journal: Journal,
}

impl ProbeRule {
    #[must_use]
    pub fn new(name: impl Into<String>, outcome: ProbeOutcome, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            outcome,
            delay: None,
            journal: journal.clone(),
        }
    }

    #[must_use]
    pub fn passing(name: impl Into<String>, journal: &Journal) -> Self {
        Self::new(name, ProbeOutcome::Pass, journal)
    }

    #[must_use]
    pub fn failing(name: impl Into<String>, journal: &Journal) -> Self {
        Self::new(name, ProbeOutcome::Fail, journal)
    }

    #[must_use]
    pub fn faulting(name: impl Into<String>, journal: &Journal) -> Self {
        Self::new(name, ProbeOutcome::Fault, journal)
    }

    /// Sleep for `delay` inside every evaluate
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl<P: ?Sized> Rule<P> for ProbeRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, _plan: &P) -> Result<Verdict, RuleFault> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.journal.record(Event::Evaluated(self.name.clone()));
        self.outcome.result(&self.name)
    }

    fn undo(&self) {
        self.journal.record(Event::Undone(self.name.clone()));
    }
}

/// Check that records every call
#[derive(Debug)]
pub struct ProbeCheck {
    name: String,
    outcome: ProbeOutcome,
    journal: Journal,
}

impl ProbeCheck {
    #[must_use]
    pub fn new(name: impl Into<String>, outcome: ProbeOutcome, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            outcome,
            journal: journal.clone(),
        }
    }

    #[must_use]
    pub fn passing(name: impl Into<String>, journal: &Journal) -> Self {
        Self::new(name, ProbeOutcome::Pass, journal)
    }

    #[must_use]
    pub fn failing(name: impl Into<String>, journal: &Journal) -> Self {
        Self::new(name, ProbeOutcome::Fail, journal)
    }
}

impl<P: ?Sized> Check<P> for ProbeCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, _plan: &P) -> Result<Verdict, RuleFault> {
        self.journal.record(Event::Checked(self.name.clone()));
        self.outcome.result(&self.name)
    }
}

/// Scenario window day
fn scenario_day(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 10)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap_or_default()
}

/// Power 90, altitude 600, window 08:00 to 21:00
#[must_use]
pub fn scenario_plan() -> MissionPlan {
    plan_with_power(90.0)
}

/// The scenario plan with a different power draw
#[must_use]
pub fn plan_with_power(power: f64) -> MissionPlan {
    MissionPlan::builder()
        .power_consumption(power)
        .altitude(600.0)
        .window(scenario_day(8), scenario_day(21))
        .build()
}

/// Probe names `r0..rN`
#[must_use]
pub fn probe_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("r{i}")).collect()
}
