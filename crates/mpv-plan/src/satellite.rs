//! External satellite state
//!
//! Rules never mutate the plan. Their side effects land here instead:
//! power reservations and thermal adjustments that undo must reverse.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Snapshot of committed effects on a satellite
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SatelliteLedger {
    /// Power currently reserved by accepted checks
    pub reserved_power: f64,
    /// Number of thermal adjustments currently applied
    pub thermal_adjustments: u32,
}

/// Satellite capacity plus the ledger of reservations made against it
///
/// Shared between rules through `Arc`. The ledger is guarded by a lock so
/// pipelines validating different plans against one satellite stay sound.
#[derive(Debug)]
pub struct SatelliteState {
    available_power: f64,
    max_allowed_temperature: f64,
    ledger: Mutex<SatelliteLedger>,
}

impl SatelliteState {
    /// Create a satellite with nothing reserved
    #[must_use]
    pub fn new(available_power: f64, max_allowed_temperature: f64) -> Self {
        Self {
            available_power,
            max_allowed_temperature,
            ledger: Mutex::new(SatelliteLedger::default()),
        }
    }

    /// Total power capacity
    #[inline]
    #[must_use]
    pub fn available_power(&self) -> f64 {
        self.available_power
    }

    /// Temperature ceiling
    #[inline]
    #[must_use]
    pub fn max_allowed_temperature(&self) -> f64 {
        self.max_allowed_temperature
    }

    /// Capacity not yet reserved
    #[must_use]
    pub fn headroom(&self) -> f64 {
        self.available_power - self.ledger.lock().reserved_power
    }

    /// Copy of the current ledger
    #[must_use]
    pub fn ledger(&self) -> SatelliteLedger {
        *self.ledger.lock()
    }

    /// Reserve `amount` if it fits in the remaining headroom
    ///
    /// Check and reservation happen under one lock acquisition.
    /// Returns `false` and reserves nothing when it does not fit.
    pub fn try_reserve_power(&self, amount: f64) -> bool {
        let mut ledger = self.ledger.lock();
        if ledger.reserved_power + amount > self.available_power {
            return false;
        }
        ledger.reserved_power += amount;
        tracing::trace!(amount, reserved = ledger.reserved_power, "power reserved");
        true
    }

    /// Release a previous reservation
    pub fn release_power(&self, amount: f64) {
        let mut ledger = self.ledger.lock();
        ledger.reserved_power = (ledger.reserved_power - amount).max(0.0);
        tracing::trace!(amount, reserved = ledger.reserved_power, "power released");
    }

    /// Record a thermal adjustment
    pub fn apply_thermal_adjustment(&self) {
        self.ledger.lock().thermal_adjustments += 1;
    }

    /// Revert one thermal adjustment
    pub fn revert_thermal_adjustment(&self) {
        let mut ledger = self.ledger.lock();
        ledger.thermal_adjustments = ledger.thermal_adjustments.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_within_headroom() {
        let sat = SatelliteState::new(2000.0, 320.0);
        assert!(sat.try_reserve_power(1500.0));
        assert_eq!(sat.headroom(), 500.0);
    }

    #[test]
    fn reserve_beyond_headroom_reserves_nothing() {
        let sat = SatelliteState::new(2000.0, 320.0);
        assert!(sat.try_reserve_power(1500.0));
        assert!(!sat.try_reserve_power(1500.0));
        assert_eq!(sat.ledger().reserved_power, 1500.0);
    }

    #[test]
    fn release_restores_headroom() {
        let sat = SatelliteState::new(2000.0, 320.0);
        assert!(sat.try_reserve_power(1500.0));
        sat.release_power(1500.0);
        assert_eq!(sat.ledger(), SatelliteLedger::default());
    }

    #[test]
    fn thermal_revert_saturates() {
        let sat = SatelliteState::new(2000.0, 320.0);
        sat.revert_thermal_adjustment();
        assert_eq!(sat.ledger().thermal_adjustments, 0);
        sat.apply_thermal_adjustment();
        sat.apply_thermal_adjustment();
        sat.revert_thermal_adjustment();
        assert_eq!(sat.ledger().thermal_adjustments, 1);
    }
}
