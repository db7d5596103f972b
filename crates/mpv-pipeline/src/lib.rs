//! MPV Pipeline
//!
//! Queue-based rule engine with an execution history and symmetric
//! rollback.
//!
//! # Core Concepts
//!
//! - [`Pipeline`]: FIFO pending queue, fail-fast run, reverse undo
//! - [`PipelineState`]: Lifecycle guarded by [`validate_transition`]
//! - [`PipelineConfig`]: Name, deadline, auto-rollback and queue limit
//! - [`HistoryEntry`]: One attempted rule and its [`EntryOutcome`]
//! - [`RunReport`]: Serializable summary of a run, keyed by [`RunId`]
//! - [`PipelineError`]: Configuration faults, rule faults, deadline expiry
//!
//! # Example
//!
//! ```rust,ignore
//! use mpv_pipeline::{Pipeline, PipelineConfig};
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::new().with_auto_rollback(true));
//! pipeline.enqueue(reserve_power)?;
//! pipeline.enqueue(check_altitude)?;
//!
//! if !pipeline.run_all(&plan)? {
//!     // reservations already released
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod engine;
mod error;
mod history;
mod report;
pub mod state;

// Re-exports
pub use config::PipelineConfig;
pub use engine::Pipeline;
pub use error::PipelineError;
pub use history::{EntryOutcome, HistoryEntry};
pub use report::{RunId, RunOutcome, RunReport};
pub use state::{allowed_transitions, validate_transition, PipelineState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
