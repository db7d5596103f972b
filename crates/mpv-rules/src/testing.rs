//! Recording probes for unit tests in this crate.

use crate::error::RuleFault;
use crate::rule::{Check, Rule, Verdict};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Outcome {
    Pass,
    Fail,
    Fault,
}

impl Outcome {
    fn result(self, name: &str) -> Result<Verdict, RuleFault> {
        match self {
            Self::Pass => Ok(Verdict::Pass),
            Self::Fail => Ok(Verdict::Fail),
            Self::Fault => Err(RuleFault::malformed(name, "probe fault")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Journal {
    evaluated: Arc<Mutex<Vec<String>>>,
    undone: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub(crate) fn evaluated(&self) -> Vec<String> {
        self.evaluated.lock().clone()
    }

    pub(crate) fn undone(&self) -> Vec<String> {
        self.undone.lock().clone()
    }
}

#[derive(Debug)]
pub(crate) struct Probe {
    name: String,
    outcome: Outcome,
    journal: Journal,
}

impl Probe {
    fn new(name: &str, outcome: Outcome, journal: &Journal) -> Self {
        Self {
            name: name.to_owned(),
            outcome,
            journal: journal.clone(),
        }
    }

    pub(crate) fn pass(name: &str, journal: &Journal) -> Self {
        Self::new(name, Outcome::Pass, journal)
    }

    pub(crate) fn fail(name: &str, journal: &Journal) -> Self {
        Self::new(name, Outcome::Fail, journal)
    }

    pub(crate) fn fault(name: &str, journal: &Journal) -> Self {
        Self::new(name, Outcome::Fault, journal)
    }
}

impl<P: ?Sized> Rule<P> for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, _plan: &P) -> Result<Verdict, RuleFault> {
        self.journal.evaluated.lock().push(self.name.clone());
        self.outcome.result(&self.name)
    }

    fn undo(&self) {
        self.journal.undone.lock().push(self.name.clone());
    }
}

#[derive(Debug)]
pub(crate) struct ProbeCheck(Probe);

impl ProbeCheck {
    pub(crate) fn pass(name: &str, journal: &Journal) -> Self {
        Self(Probe::pass(name, journal))
    }

    pub(crate) fn fail(name: &str, journal: &Journal) -> Self {
        Self(Probe::fail(name, journal))
    }
}

impl<P: ?Sized> Check<P> for ProbeCheck {
    fn name(&self) -> &str {
        &self.0.name
    }

    fn check(&self, plan: &P) -> Result<Verdict, RuleFault> {
        Rule::<P>::evaluate(&self.0, plan)
    }
}
