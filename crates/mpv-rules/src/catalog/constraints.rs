//! Effect-free mission checks

use crate::error::RuleFault;
use crate::rule::{Check, Verdict};
use chrono::NaiveTime;
use mpv_plan::MissionPlan;

/// Accepts every plan
///
/// Used as the base of a decorator stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicCheck;

impl Check<MissionPlan> for BasicCheck {
    fn name(&self) -> &str {
        "basic"
    }

    fn check(&self, _plan: &MissionPlan) -> Result<Verdict, RuleFault> {
        Ok(Verdict::Pass)
    }
}

/// Rejects plans drawing more than `max` power
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLimit {
    max: f64,
}

impl PowerLimit {
    /// Create with an upper bound
    #[inline]
    #[must_use]
    pub fn new(max: f64) -> Self {
        Self { max }
    }
}

impl Check<MissionPlan> for PowerLimit {
    fn name(&self) -> &str {
        "power-limit"
    }

    fn check(&self, plan: &MissionPlan) -> Result<Verdict, RuleFault> {
        let power = plan.require_power()?;
        if power > self.max {
            tracing::warn!(power, max = self.max, "power consumption exceeds limit");
        }
        Ok(Verdict::from(power <= self.max))
    }
}

/// Rejects plans outside `min..=max` altitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeRange {
    min: f64,
    max: f64,
}

impl AltitudeRange {
    /// Create with inclusive bounds
    #[inline]
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Check<MissionPlan> for AltitudeRange {
    fn name(&self) -> &str {
        "altitude-range"
    }

    fn check(&self, plan: &MissionPlan) -> Result<Verdict, RuleFault> {
        let altitude = plan.require_altitude()?;
        let inside = (self.min..=self.max).contains(&altitude);
        if !inside {
            tracing::warn!(altitude, min = self.min, max = self.max, "altitude out of range");
        }
        Ok(Verdict::from(inside))
    }
}

/// Rejects plans starting before `earliest` or ending after `latest`
///
/// Compares times of day, so a window ending at 22:30 fails a latest end
/// of 22:00. The calendar date is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    earliest: NaiveTime,
    latest: NaiveTime,
}

impl TimeWindow {
    /// Create with the allowed start and end times of day
    #[inline]
    #[must_use]
    pub fn new(earliest: NaiveTime, latest: NaiveTime) -> Self {
        Self { earliest, latest }
    }

    /// Create from whole hours
    ///
    /// An hour past 23 means the end of the day.
    #[must_use]
    pub fn from_hours(earliest: u32, latest: u32) -> Self {
        Self::new(hour_of_day(earliest), hour_of_day(latest))
    }
}

fn hour_of_day(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0)
        .or_else(|| NaiveTime::from_hms_opt(23, 59, 59))
        .unwrap_or_default()
}

impl Check<MissionPlan> for TimeWindow {
    fn name(&self) -> &str {
        "time-window"
    }

    fn check(&self, plan: &MissionPlan) -> Result<Verdict, RuleFault> {
        let (start, end) = plan.require_window()?;
        let outside = start.time() < self.earliest || end.time() > self.latest;
        if outside {
            tracing::warn!(%start, %end, "mission window outside allowed hours");
        }
        Ok(Verdict::from(!outside))
    }
}
