//! Rules with reversible effects on a [`SatelliteState`]

use crate::error::RuleFault;
use crate::rule::{Rule, Verdict};
use mpv_plan::{MissionPlan, SatelliteState};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reserves the plan's power draw on the satellite
///
/// Passes when the draw fits in the satellite's remaining headroom and
/// keeps the reservation until `undo`. Other reservations see less
/// headroom; a repeated evaluate replaces this rule's own reservation.
#[derive(Debug)]
pub struct PowerReservation {
    satellite: Arc<SatelliteState>,
    pending: Mutex<Option<f64>>,
}

impl PowerReservation {
    /// Create against a shared satellite
    #[must_use]
    pub fn new(satellite: Arc<SatelliteState>) -> Self {
        Self {
            satellite,
            pending: Mutex::new(None),
        }
    }
}

impl Rule<MissionPlan> for PowerReservation {
    fn name(&self) -> &str {
        "power-reservation"
    }

    fn evaluate(&self, plan: &MissionPlan) -> Result<Verdict, RuleFault> {
        let power = plan.require_power()?;
        if power < 0.0 {
            return Err(RuleFault::malformed(self.name(), "negative power draw"));
        }

        // Only the latest reservation stays committed, so release the one
        // from a previous evaluate before checking headroom.
        let mut pending = self.pending.lock();
        let previous = pending.take();
        if let Some(previous) = previous {
            self.satellite.release_power(previous);
        }

        if !self.satellite.try_reserve_power(power) {
            tracing::warn!(
                power,
                headroom = self.satellite.headroom(),
                "insufficient power"
            );
            // The earlier successful evaluate stays the one eligible for undo.
            if let Some(previous) = previous {
                if self.satellite.try_reserve_power(previous) {
                    *pending = Some(previous);
                }
            }
            return Ok(Verdict::Fail);
        }

        *pending = Some(power);
        tracing::debug!(power, "power reserved");
        Ok(Verdict::Pass)
    }

    fn undo(&self) {
        if let Some(power) = self.pending.lock().take() {
            self.satellite.release_power(power);
            tracing::debug!(power, "power reservation released");
        }
    }
}

/// Applies a thermal adjustment when the plan's peak temperature is allowed
#[derive(Debug)]
pub struct ThermalGuard {
    satellite: Arc<SatelliteState>,
    applied: AtomicBool,
}

impl ThermalGuard {
    /// Create against a shared satellite
    #[must_use]
    pub fn new(satellite: Arc<SatelliteState>) -> Self {
        Self {
            satellite,
            applied: AtomicBool::new(false),
        }
    }
}

impl Rule<MissionPlan> for ThermalGuard {
    fn name(&self) -> &str {
        "thermal-guard"
    }

    fn evaluate(&self, plan: &MissionPlan) -> Result<Verdict, RuleFault> {
        let temperature = plan.require_temperature()?;
        let ceiling = self.satellite.max_allowed_temperature();
        if temperature > ceiling {
            tracing::warn!(temperature, ceiling, "temperature above ceiling");
            return Ok(Verdict::Fail);
        }

        if !self.applied.swap(true, Ordering::AcqRel) {
            self.satellite.apply_thermal_adjustment();
        }
        tracing::debug!(temperature, "thermal adjustment applied");
        Ok(Verdict::Pass)
    }

    fn undo(&self) {
        if self.applied.swap(false, Ordering::AcqRel) {
            self.satellite.revert_thermal_adjustment();
            tracing::debug!("thermal adjustment reverted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpv_plan::SatelliteLedger;
    use pretty_assertions::assert_eq;

    fn satellite() -> Arc<SatelliteState> {
        Arc::new(SatelliteState::new(2000.0, 320.0))
    }

    fn plan(power: f64, temperature: f64) -> MissionPlan {
        MissionPlan::builder()
            .power_consumption(power)
            .max_temperature(temperature)
            .build()
    }

    #[test]
    fn reservation_commits_and_undoes() {
        let sat = satellite();
        let rule = PowerReservation::new(Arc::clone(&sat));

        assert_eq!(rule.evaluate(&plan(1500.0, 300.0)).unwrap(), Verdict::Pass);
        assert_eq!(sat.ledger().reserved_power, 1500.0);

        rule.undo();
        assert_eq!(sat.ledger().reserved_power, 0.0);
        rule.undo();
        assert_eq!(sat.ledger().reserved_power, 0.0);
    }

    #[test]
    fn failed_reservation_commits_nothing() {
        let sat = satellite();
        let rule = PowerReservation::new(Arc::clone(&sat));

        assert_eq!(rule.evaluate(&plan(2500.0, 300.0)).unwrap(), Verdict::Fail);
        rule.undo();
        assert_eq!(sat.ledger(), SatelliteLedger::default());
    }

    #[test]
    fn reservations_share_headroom() {
        let sat = satellite();
        let first = PowerReservation::new(Arc::clone(&sat));
        let second = PowerReservation::new(Arc::clone(&sat));

        assert!(first.evaluate(&plan(1500.0, 300.0)).unwrap().is_pass());
        assert!(second.evaluate(&plan(1500.0, 300.0)).unwrap().is_fail());
    }

    #[test]
    fn repeated_evaluate_keeps_one_reservation() {
        let sat = satellite();
        let rule = PowerReservation::new(Arc::clone(&sat));

        rule.evaluate(&plan(500.0, 300.0)).unwrap();
        rule.evaluate(&plan(700.0, 300.0)).unwrap();
        assert_eq!(sat.ledger().reserved_power, 700.0);

        rule.undo();
        assert_eq!(sat.ledger().reserved_power, 0.0);
    }

    #[test]
    fn same_plan_evaluates_identically_above_half_capacity() {
        let sat = satellite();
        let rule = PowerReservation::new(Arc::clone(&sat));

        assert_eq!(rule.evaluate(&plan(1500.0, 300.0)).unwrap(), Verdict::Pass);
        assert_eq!(rule.evaluate(&plan(1500.0, 300.0)).unwrap(), Verdict::Pass);
        assert_eq!(sat.ledger().reserved_power, 1500.0);

        rule.undo();
        assert_eq!(sat.ledger().reserved_power, 0.0);
    }

    #[test]
    fn rejected_re_evaluate_keeps_earlier_reservation() {
        let sat = satellite();
        let rule = PowerReservation::new(Arc::clone(&sat));

        assert!(rule.evaluate(&plan(1500.0, 300.0)).unwrap().is_pass());
        assert!(rule.evaluate(&plan(2500.0, 300.0)).unwrap().is_fail());
        assert_eq!(sat.ledger().reserved_power, 1500.0);

        rule.undo();
        assert_eq!(sat.ledger().reserved_power, 0.0);
    }

    #[test]
    fn negative_power_is_fault() {
        let rule = PowerReservation::new(satellite());
        assert!(matches!(
            rule.evaluate(&plan(-1.0, 300.0)),
            Err(RuleFault::Malformed { .. })
        ));
    }

    #[test]
    fn thermal_guard_applies_and_reverts() {
        let sat = satellite();
        let rule = ThermalGuard::new(Arc::clone(&sat));

        assert_eq!(rule.evaluate(&plan(0.0, 310.0)).unwrap(), Verdict::Pass);
        assert_eq!(sat.ledger().thermal_adjustments, 1);

        rule.undo();
        rule.undo();
        assert_eq!(sat.ledger().thermal_adjustments, 0);
    }

    #[test]
    fn thermal_guard_rejects_hot_plan() {
        let sat = satellite();
        let rule = ThermalGuard::new(Arc::clone(&sat));

        assert_eq!(rule.evaluate(&plan(0.0, 400.0)).unwrap(), Verdict::Fail);
        assert_eq!(sat.ledger().thermal_adjustments, 0);
    }
}
