//! Mission rule catalog
//!
//! Concrete checks and effectful rules over [`MissionPlan`]. The thresholds
//! are example mission limits, not engine behaviour; every strategy accepts
//! any rule.

mod commands;
mod constraints;

pub use commands::{PowerReservation, ThermalGuard};
pub use constraints::{AltitudeRange, BasicCheck, PowerLimit, TimeWindow};

use crate::rule::Check;
use mpv_plan::MissionPlan;
use serde::{Deserialize, Serialize};

/// Mission limits the catalog checks enforce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionLimits {
    /// Highest acceptable power draw
    pub max_power: f64,
    /// Lowest acceptable altitude (km)
    pub min_altitude: f64,
    /// Highest acceptable altitude (km)
    pub max_altitude: f64,
    /// Earliest hour a mission may start
    pub earliest_start_hour: u32,
    /// Latest hour a mission may end
    pub latest_end_hour: u32,
}

impl Default for MissionLimits {
    fn default() -> Self {
        Self {
            max_power: 100.0,
            min_altitude: 500.0,
            max_altitude: 1000.0,
            earliest_start_hour: 6,
            latest_end_hour: 22,
        }
    }
}

impl MissionLimits {
    /// Power check for these limits
    #[must_use]
    pub fn power(&self) -> PowerLimit {
        PowerLimit::new(self.max_power)
    }

    /// Altitude check for these limits
    #[must_use]
    pub fn altitude(&self) -> AltitudeRange {
        AltitudeRange::new(self.min_altitude, self.max_altitude)
    }

    /// Time-window check for these limits
    #[must_use]
    pub fn time_window(&self) -> TimeWindow {
        TimeWindow::from_hours(self.earliest_start_hour, self.latest_end_hour)
    }

    /// The standard checks in evaluation order: time, altitude, power
    #[must_use]
    pub fn checks(&self) -> Vec<Box<dyn Check<MissionPlan>>> {
        vec![
            Box::new(self.time_window()),
            Box::new(self.altitude()),
            Box::new(self.power()),
        ]
    }
}
