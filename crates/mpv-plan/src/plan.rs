//! Mission plan record
//!
//! Provides [`MissionPlan`], the flat record every rule reads during a run.

use crate::error::PlanError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Named plan fields, used in diagnostics and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanField {
    /// Requested power draw
    PowerConsumption,
    /// Peak operating temperature
    MaxTemperature,
    /// Operating altitude in km
    Altitude,
    /// Window start
    StartTime,
    /// Window end
    EndTime,
}

impl PlanField {
    /// Field name as it appears in plan documents
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PowerConsumption => "power_consumption",
            Self::MaxTemperature => "max_temperature",
            Self::Altitude => "altitude",
            Self::StartTime => "start_time",
            Self::EndTime => "end_time",
        }
    }
}

impl Display for PlanField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mission plan under validation
///
/// All fields are optional so a partially specified document still loads;
/// a rule that needs an absent field reports [`PlanError::MissingField`]
/// through the `require_*` accessors instead of rejecting the mission.
///
/// The plan is passed by shared reference to every rule and is never
/// mutated during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionPlan {
    /// Requested power draw
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_consumption: Option<f64>,

    /// Peak operating temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temperature: Option<f64>,

    /// Operating altitude in km
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,

    /// Window start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveDateTime>,

    /// Window end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveDateTime>,
}

impl MissionPlan {
    /// Create an empty plan
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a plan
    #[inline]
    #[must_use]
    pub fn builder() -> MissionPlanBuilder {
        MissionPlanBuilder::default()
    }

    /// Power consumption, or an error if absent or not finite
    pub fn require_power(&self) -> Result<f64, PlanError> {
        require_finite(PlanField::PowerConsumption, self.power_consumption)
    }

    /// Peak temperature, or an error if absent or not finite
    pub fn require_temperature(&self) -> Result<f64, PlanError> {
        require_finite(PlanField::MaxTemperature, self.max_temperature)
    }

    /// Altitude, or an error if absent or not finite
    pub fn require_altitude(&self) -> Result<f64, PlanError> {
        require_finite(PlanField::Altitude, self.altitude)
    }

    /// Start and end of the mission window
    ///
    /// # Errors
    /// - [`PlanError::MissingField`] if either bound is absent
    /// - [`PlanError::InvertedWindow`] if the window ends before it starts
    pub fn require_window(&self) -> Result<(NaiveDateTime, NaiveDateTime), PlanError> {
        let start = self
            .start_time
            .ok_or(PlanError::MissingField(PlanField::StartTime))?;
        let end = self
            .end_time
            .ok_or(PlanError::MissingField(PlanField::EndTime))?;

        if end < start {
            return Err(PlanError::InvertedWindow { start, end });
        }

        Ok((start, end))
    }

    /// Fields currently set on this plan
    #[must_use]
    pub fn present_fields(&self) -> Vec<PlanField> {
        let mut fields = Vec::with_capacity(5);
        if self.power_consumption.is_some() {
            fields.push(PlanField::PowerConsumption);
        }
        if self.max_temperature.is_some() {
            fields.push(PlanField::MaxTemperature);
        }
        if self.altitude.is_some() {
            fields.push(PlanField::Altitude);
        }
        if self.start_time.is_some() {
            fields.push(PlanField::StartTime);
        }
        if self.end_time.is_some() {
            fields.push(PlanField::EndTime);
        }
        fields
    }
}

fn require_finite(field: PlanField, value: Option<f64>) -> Result<f64, PlanError> {
    let value = value.ok_or(PlanError::MissingField(field))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PlanError::InvalidValue {
            field,
            reason: format!("{value} is not a finite number"),
        })
    }
}

/// Builder for [`MissionPlan`]
#[derive(Debug, Clone, Default)]
pub struct MissionPlanBuilder {
    plan: MissionPlan,
}

impl MissionPlanBuilder {
    /// Set power consumption
    #[inline]
    #[must_use]
    pub fn power_consumption(mut self, value: f64) -> Self {
        self.plan.power_consumption = Some(value);
        self
    }

    /// Set peak temperature
    #[inline]
    #[must_use]
    pub fn max_temperature(mut self, value: f64) -> Self {
        self.plan.max_temperature = Some(value);
        self
    }

    /// Set altitude
    #[inline]
    #[must_use]
    pub fn altitude(mut self, value: f64) -> Self {
        self.plan.altitude = Some(value);
        self
    }

    /// Set the mission window
    #[inline]
    #[must_use]
    pub fn window(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.plan.start_time = Some(start);
        self.plan.end_time = Some(end);
        self
    }

    /// Finish building
    #[inline]
    #[must_use]
    pub fn build(self) -> MissionPlan {
        self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 10)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn builder_sets_fields() {
        let plan = MissionPlan::builder()
            .power_consumption(90.0)
            .altitude(600.0)
            .window(at(8), at(21))
            .build();

        assert_eq!(plan.require_power().unwrap(), 90.0);
        assert_eq!(plan.require_altitude().unwrap(), 600.0);
        assert_eq!(plan.require_window().unwrap(), (at(8), at(21)));
        assert!(plan.max_temperature.is_none());
    }

    #[test]
    fn missing_field_is_reported() {
        let plan = MissionPlan::new();
        assert_eq!(
            plan.require_power(),
            Err(PlanError::MissingField(PlanField::PowerConsumption))
        );
        assert_eq!(
            plan.require_window(),
            Err(PlanError::MissingField(PlanField::StartTime))
        );
    }

    #[test]
    fn non_finite_value_is_invalid() {
        let plan = MissionPlan::builder().altitude(f64::NAN).build();
        assert!(matches!(
            plan.require_altitude(),
            Err(PlanError::InvalidValue {
                field: PlanField::Altitude,
                ..
            })
        ));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let plan = MissionPlan::builder().window(at(21), at(8)).build();
        assert!(matches!(
            plan.require_window(),
            Err(PlanError::InvertedWindow { .. })
        ));
    }

    #[test]
    fn present_fields_in_declaration_order() {
        let plan = MissionPlan::builder()
            .altitude(600.0)
            .power_consumption(1.0)
            .build();
        assert_eq!(
            plan.present_fields(),
            vec![PlanField::PowerConsumption, PlanField::Altitude]
        );
    }

    #[test]
    fn deserializes_partial_json() {
        let plan: MissionPlan =
            serde_json::from_str(r#"{"altitude": 600, "start_time": "2025-05-10T08:00:00"}"#)
                .unwrap();
        assert_eq!(plan.altitude, Some(600.0));
        assert_eq!(plan.start_time, Some(at(8)));
        assert!(plan.power_consumption.is_none());
    }
}
