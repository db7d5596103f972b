//! Strategy assembly
//!
//! Builds the standard mission checks into each of the five strategies and
//! runs a plan through the selected one.

use anyhow::Context;
use mpv_pipeline::{Pipeline, PipelineConfig, PipelineError};
use mpv_plan::MissionPlan;
use mpv_rules::catalog::{BasicCheck, MissionLimits};
use mpv_rules::{
    ChainBuilder, ChainNode, CheckRule, CompositeRule, ConfigError, DecoratorStack, Rule, RuleAggregator,
    RuleExt, RuleFault,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How the mission checks are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum Strategy {
    /// Queue-based engine with history and undo
    Pipeline,
    /// One composite group
    Composite,
    /// Decorator stack over a pass-through base
    Decorator,
    /// Chain of responsibility
    Chain,
    /// Registration-ordered aggregator
    Aggregator,
}

impl Strategy {
    pub(crate) const ALL: [Self; 5] = [
        Self::Pipeline,
        Self::Composite,
        Self::Decorator,
        Self::Chain,
        Self::Aggregator,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Composite => "composite",
            Self::Decorator => "decorator",
            Self::Chain => "chain",
            Self::Aggregator => "aggregator",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating one plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Decision {
    Approved,
    Rejected { reason: Option<String> },
    Faulted { rule: Option<String>, reason: String },
}

impl Decision {
    /// Process exit code: 0 approved, 1 rejected, 2 fault
    pub(crate) fn exit_code(&self) -> u8 {
        match self {
            Self::Approved => 0,
            Self::Rejected { .. } => 1,
            Self::Faulted { .. } => 2,
        }
    }

    fn from_verdict(result: Result<bool, RuleFault>) -> Self {
        match result {
            Ok(true) => Self::Approved,
            Ok(false) => Self::Rejected { reason: None },
            Err(fault) => Self::Faulted {
                rule: None,
                reason: fault.to_string(),
            },
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => f.write_str("APPROVED"),
            Self::Rejected { reason: None } => f.write_str("REJECTED"),
            Self::Rejected {
                reason: Some(reason),
            } => write!(f, "REJECTED ({reason})"),
            Self::Faulted {
                rule: Some(rule),
                reason,
            } => write!(f, "FAULT in {rule}: {reason}"),
            Self::Faulted { rule: None, reason } => write!(f, "FAULT: {reason}"),
        }
    }
}

/// Settings read from `--config`
///
/// Pipeline fields sit at the top level; mission limits live under
/// `[limits]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    #[serde(flatten)]
    pub(crate) pipeline: PipelineConfig,
    pub(crate) limits: MissionLimits,
}

/// Run `plan` through `strategy`
pub(crate) fn validate(
    strategy: Strategy,
    plan: &MissionPlan,
    settings: &Settings,
) -> anyhow::Result<Decision> {
    let limits = &settings.limits;
    tracing::debug!(%strategy, "assembling rules");

    let decision = match strategy {
        Strategy::Pipeline => run_pipeline(plan, limits, &settings.pipeline)?,
        Strategy::Composite => {
            let group = composite(limits);
            Decision::from_verdict(group.evaluate(plan).map(|v| v.is_pass()))
        }
        Strategy::Decorator => {
            let stack = decorator(limits).context("failed to assemble decorator stack")?;
            Decision::from_verdict(stack.evaluate(plan).map(|v| v.is_pass()))
        }
        Strategy::Chain => {
            let head = chain(limits).context("failed to assemble chain")?;
            Decision::from_verdict(head.evaluate(plan).map(|v| v.is_pass()))
        }
        Strategy::Aggregator => Decision::from_verdict(aggregator(limits).validate_all(plan)),
    };

    tracing::info!(%strategy, %decision, "validation finished");
    Ok(decision)
}

fn run_pipeline(
    plan: &MissionPlan,
    limits: &MissionLimits,
    config: &PipelineConfig,
) -> anyhow::Result<Decision> {
    let mut pipeline = Pipeline::new(config.clone());
    for check in limits.checks() {
        pipeline
            .enqueue(CheckRule::new(check))
            .context("failed to enqueue rule")?;
    }

    let result = pipeline.run_all(plan);
    let failed_rule = pipeline
        .last_report()
        .and_then(|report| report.failed_rule.clone());

    match result {
        Ok(true) => Ok(Decision::Approved),
        Ok(false) => Ok(Decision::Rejected {
            reason: failed_rule.map(|rule| format!("failed: {rule}")),
        }),
        Err(PipelineError::RuleFault { rule, source }) => Ok(Decision::Faulted {
            rule: Some(rule),
            reason: source.to_string(),
        }),
        Err(err @ PipelineError::DeadlineExceeded { .. }) => Ok(Decision::Rejected {
            reason: Some(err.to_string()),
        }),
        Err(err) => Err(err).context("pipeline misconfigured"),
    }
}

fn composite(limits: &MissionLimits) -> CompositeRule<MissionPlan> {
    limits
        .checks()
        .into_iter()
        .fold(CompositeRule::new("mission"), |group, check| {
            group.with(CheckRule::new(check))
        })
}

fn decorator(limits: &MissionLimits) -> Result<Box<dyn Rule<MissionPlan>>, ConfigError> {
    limits
        .checks()
        .into_iter()
        .fold(
            DecoratorStack::new().base(CheckRule::new(BasicCheck)),
            DecoratorStack::layer,
        )
        .build()
}

fn chain(limits: &MissionLimits) -> Result<Arc<ChainNode<MissionPlan>>, ConfigError> {
    limits
        .checks()
        .into_iter()
        .fold(ChainBuilder::new(), ChainBuilder::link)
        .build()
}

fn aggregator(limits: &MissionLimits) -> RuleAggregator<MissionPlan> {
    RuleAggregator::from_rules(
        limits
            .checks()
            .into_iter()
            .map(|check| CheckRule::new(check).boxed()),
    )
}
