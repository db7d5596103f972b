//! `mpv`: mission plan validation from the command line

mod logging;
mod strategy;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mpv_pipeline::{Pipeline, PipelineConfig};
use mpv_plan::{load_plan, read_document, MissionPlan, SatelliteState};
use mpv_rules::catalog::{MissionLimits, PowerReservation, ThermalGuard};
use mpv_rules::CheckRule;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use strategy::{Settings, Strategy};

fn cli() -> Command {
    Command::new("mpv")
        .version(mpv_pipeline::VERSION)
        .about("Mission plan validation with composable rule strategies")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("demo")
                .about("Run the sample mission through all five strategies")
                .arg(
                    Arg::new("power")
                        .long("power")
                        .default_value("90")
                        .value_parser(value_parser!(f64))
                        .help("Power consumption of the sample mission"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a plan file (exit 0 approved, 1 rejected, 2 fault)")
                .arg(
                    Arg::new("plan")
                        .long("plan")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Plan document (.json or .toml)"),
                )
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .default_value("pipeline")
                        .value_parser(value_parser!(Strategy))
                        .help("How the rules are combined"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Pipeline settings and mission limits (.toml or .json)"),
                ),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    if let Err(err) = logging::init(matches.get_flag("json")) {
        eprintln!("error: {err:#}");
        return ExitCode::from(2);
    }

    match run(&matches) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<u8> {
    match matches.subcommand() {
        Some(("demo", args)) => {
            let power = args.get_one::<f64>("power").copied().unwrap_or(90.0);
            demo(power)
        }
        Some(("validate", args)) => {
            let plan = args
                .get_one::<PathBuf>("plan")
                .context("--plan is required")?;
            let strategy = args
                .get_one::<Strategy>("strategy")
                .copied()
                .unwrap_or(Strategy::Pipeline);
            let config = args.get_one::<PathBuf>("config").map(PathBuf::as_path);
            validate_file(plan, strategy, config)
        }
        _ => anyhow::bail!("no subcommand given"),
    }
}

fn validate_file(plan: &Path, strategy: Strategy, config: Option<&Path>) -> anyhow::Result<u8> {
    let plan = load_plan(plan).context("failed to load plan")?;
    let settings: Settings = match config {
        Some(path) => read_document(path).context("failed to load settings")?,
        None => Settings::default(),
    };

    let decision = strategy::validate(strategy, &plan, &settings)?;
    println!("{strategy}: {decision}");
    Ok(decision.exit_code())
}

fn demo_time(hour: u32) -> anyhow::Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2025, 5, 10)
        .and_then(|day| day.and_hms_opt(hour, 0, 0))
        .context("invalid demo time")
}

fn demo(power: f64) -> anyhow::Result<u8> {
    let plan = MissionPlan::builder()
        .power_consumption(power)
        .max_temperature(310.0)
        .altitude(600.0)
        .window(demo_time(8)?, demo_time(21)?)
        .build();

    println!("Mission: power={power} altitude=600 window=08:00-21:00");
    println!();

    let settings = Settings::default();
    let mut worst = 0;
    for strategy in Strategy::ALL {
        let decision = strategy::validate(strategy, &plan, &settings)?;
        println!("  {:<11} {decision}", strategy.as_str());
        worst = worst.max(decision.exit_code());
    }

    println!();
    satellite_demo(&plan, &settings.limits)?;
    Ok(worst)
}

/// Reservations against a satellite, then a full rollback
fn satellite_demo(plan: &MissionPlan, limits: &MissionLimits) -> anyhow::Result<()> {
    let satellite = Arc::new(SatelliteState::new(2000.0, 320.0));
    let mut pipeline = Pipeline::new(PipelineConfig::new().with_name("satellite"));
    pipeline.enqueue(PowerReservation::new(Arc::clone(&satellite)))?;
    pipeline.enqueue(ThermalGuard::new(Arc::clone(&satellite)))?;
    pipeline.enqueue(CheckRule::new(limits.altitude()))?;
    pipeline.enqueue(CheckRule::new(limits.power()))?;

    let approved = pipeline.run_all(plan)?;
    let ledger = satellite.ledger();
    println!(
        "Satellite: {} (reserved={} thermal_adjustments={})",
        if approved { "APPROVED" } else { "REJECTED" },
        ledger.reserved_power,
        ledger.thermal_adjustments,
    );

    let undone = pipeline.undo_all()?;
    let ledger = satellite.ledger();
    println!(
        "Rolled back {undone} rules (reserved={} thermal_adjustments={})",
        ledger.reserved_power, ledger.thermal_adjustments,
    );
    Ok(())
}
