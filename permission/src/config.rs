//! Configuration for the permission engine.

use serde::{Deserialize, Serialize};

use crate::decision::DEFAULT_THRESHOLD;
use crate::requirement::{default_requirements, PermissionRequirement};
use crate::types::{OverlapMode, PermissionError, Result};

/// Default number of decisions kept in the audit log.
pub const DEFAULT_AUDIT_CAPACITY: usize = 10_000;

/// Permission engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionConfig {
    /// Overlap an identity must reach
    pub threshold: f64,
    /// How overlap is measured
    pub overlap_mode: OverlapMode,
    /// Decisions retained by the audit log
    pub audit_capacity: usize,
    /// Action requirements; the built-in set is used when empty
    pub requirements: Vec<PermissionRequirement>,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            overlap_mode: OverlapMode::default(),
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            requirements: Vec::new(),
        }
    }
}

impl PermissionConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Configured requirements, or the built-in set.
    pub fn effective_requirements(&self) -> Vec<PermissionRequirement> {
        if self.requirements.is_empty() {
            default_requirements()
        } else {
            self.requirements.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PermissionError::ConfigError(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.audit_capacity == 0 {
            return Err(PermissionError::ConfigError(
                "audit_capacity must be positive".to_string(),
            ));
        }

        for requirement in &self.requirements {
            if requirement.action_name.trim().is_empty() {
                return Err(PermissionError::ConfigError(
                    "requirement with empty action_name".to_string(),
                ));
            }
            if !(0.0..=1.0).contains(&requirement.min_sovereignty) {
                return Err(PermissionError::ConfigError(format!(
                    "{}: min_sovereignty must be within [0, 1], got {}",
                    requirement.action_name, requirement.min_sovereignty
                )));
            }
            if let Some((category, min)) = requirement
                .required_scores
                .iter()
                .find(|(_, min)| !(0.0..=1.0).contains(*min))
            {
                return Err(PermissionError::ConfigError(format!(
                    "{}: required score for '{}' must be within [0, 1], got {}",
                    requirement.action_name, category, min
                )));
            }
        }
        Ok(())
    }
}
