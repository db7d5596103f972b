//! MPV Plan Model
//!
//! The subject of validation and the external resources rules act upon.
//!
//! # Core Concepts
//!
//! - [`MissionPlan`]: Flat record of optional scalar fields, read-only during a run
//! - [`PlanField`]: Names a plan field for diagnostics
//! - [`PlanError`]: Malformed plan input (missing or unusable field)
//! - [`SatelliteState`]: Shared external resource with reversible reservations
//! - [`load_plan`] / [`read_document`]: JSON or TOML document loading
//!
//! # Example
//!
//! ```rust,ignore
//! use mpv_plan::MissionPlan;
//!
//! let plan = MissionPlan::builder()
//!     .power_consumption(90.0)
//!     .altitude(600.0)
//!     .build();
//!
//! assert_eq!(plan.require_power()?, 90.0);
//! assert!(plan.require_window().is_err()); // no start/end time
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod load;
mod plan;
mod satellite;

// Re-exports
pub use error::{LoadError, PlanError};
pub use load::{load_plan, read_document, DocumentFormat};
pub use plan::{MissionPlan, MissionPlanBuilder, PlanField};
pub use satellite::{SatelliteLedger, SatelliteState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
