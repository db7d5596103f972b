//! Error types for the plan model
//!
//! Two families, kept apart because they travel differently:
//! - [`PlanError`]: a rule could not interpret the plan (becomes a rule fault)
//! - [`LoadError`]: a plan or config document could not be read

use crate::plan::PlanField;
use chrono::NaiveDateTime;
use std::path::PathBuf;

/// Plan field access errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// A field the rule needs is absent
    #[error("required field `{0}` is missing")]
    MissingField(PlanField),

    /// A field is present but unusable
    #[error("field `{field}` is invalid: {reason}")]
    InvalidValue {
        /// Offending field
        field: PlanField,
        /// Why the value was rejected
        reason: String,
    },

    /// The time window ends before it starts
    #[error("time window ends ({end}) before it starts ({start})")]
    InvertedWindow {
        /// Window start
        start: NaiveDateTime,
        /// Window end
        end: NaiveDateTime,
    },
}

/// Document loading errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Extension is neither `.json` nor `.toml`
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(PathBuf),

    /// JSON parse failure
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File path
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// TOML parse failure
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        /// File path
        path: PathBuf,
        /// Parser error
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_the_field() {
        let err = PlanError::MissingField(PlanField::Altitude);
        assert_eq!(err.to_string(), "required field `altitude` is missing");
    }

    #[test]
    fn unsupported_format_display() {
        let err = LoadError::UnsupportedFormat(PathBuf::from("plan.yaml"));
        assert!(err.to_string().contains("plan.yaml"));
    }
}
