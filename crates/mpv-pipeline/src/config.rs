//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pipeline configuration
///
/// Every field has a default, so a TOML file may set only what it needs:
///
/// ```toml
/// name = "launch-review"
/// deadline_ms = 250
/// auto_rollback = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name shown in logs and run reports
    pub name: String,
    /// Wall-clock bound on one run, checked between rules
    pub deadline_ms: Option<u64>,
    /// Undo committed rules inside `run_all` when a rule fails
    pub auto_rollback: bool,
    /// Maximum number of pending rules
    pub max_pending: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "mission-validation".to_owned(),
            deadline_ms: None,
            auto_rollback: false,
            max_pending: None,
        }
    }
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// With run deadline
    #[inline]
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// With automatic rollback on failure
    #[inline]
    #[must_use]
    pub fn with_auto_rollback(mut self, enabled: bool) -> Self {
        self.auto_rollback = enabled;
        self
    }

    /// With pending queue limit
    #[inline]
    #[must_use]
    pub fn with_max_pending(mut self, limit: usize) -> Self {
        self.max_pending = Some(limit);
        self
    }

    /// Run deadline as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_sets_fields() {
        let config = PipelineConfig::new()
            .with_name("review")
            .with_deadline(Duration::from_millis(250))
            .with_auto_rollback(true)
            .with_max_pending(8);

        assert_eq!(config.name, "review");
        assert_eq!(config.deadline(), Some(Duration::from_millis(250)));
        assert!(config.auto_rollback);
        assert_eq!(config.max_pending, Some(8));
    }

    #[test]
    fn toml_fills_defaults() {
        let config: PipelineConfig = toml::from_str("auto_rollback = true\n").unwrap();
        assert_eq!(config.name, "mission-validation");
        assert!(config.auto_rollback);
        assert_eq!(config.deadline(), None);
    }
}
