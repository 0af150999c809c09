//! Per-action permission requirements.
//!
//! Requirements are static configuration: a sparse map of minimum category
//! scores plus a minimum sovereignty. Unknown actions have no requirement and
//! are refused by the engine.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::types::Result;

/// What an action demands of the acting identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionRequirement {
    pub action_name: String,
    /// Category name -> minimum score
    #[serde(default)]
    pub required_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub min_sovereignty: f64,
}

impl PermissionRequirement {
    pub fn new(action_name: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            required_scores: BTreeMap::new(),
            min_sovereignty: 0.0,
        }
    }

    /// Require a minimum score in a category.
    pub fn require(mut self, category: impl Into<String>, min_score: f64) -> Self {
        self.required_scores.insert(category.into(), min_score);
        self
    }

    /// Set the minimum sovereignty.
    pub fn min_sovereignty(mut self, min_sovereignty: f64) -> Self {
        self.min_sovereignty = min_sovereignty;
        self
    }

    /// Minimum score for a category; unlisted categories require 0.
    pub fn required(&self, category: &str) -> f64 {
        self.required_scores.get(category).copied().unwrap_or(0.0)
    }
}

/// Requirements indexed by action name.
#[derive(Debug, Clone, Default)]
pub struct RequirementRegistry {
    requirements: HashMap<String, PermissionRequirement>,
}

impl RequirementRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in requirements.
    ///
    /// Low-risk writes ask for modest scores; destructive or irreversible
    /// actions ask for high scores across several categories.
    pub fn defaults() -> Self {
        let mut registry = Self::new();
        for requirement in default_requirements() {
            registry.register(requirement);
        }
        registry
    }

    /// Registry from a YAML list of requirements.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let requirements: Vec<PermissionRequirement> = serde_yaml::from_str(yaml)?;
        Ok(Self::from_requirements(requirements))
    }

    pub fn from_requirements(requirements: impl IntoIterator<Item = PermissionRequirement>) -> Self {
        let mut registry = Self::new();
        for requirement in requirements {
            registry.register(requirement);
        }
        registry
    }

    /// Add or replace a requirement.
    pub fn register(&mut self, requirement: PermissionRequirement) {
        self.requirements
            .insert(requirement.action_name.clone(), requirement);
    }

    pub fn get(&self, action_name: &str) -> Option<&PermissionRequirement> {
        self.requirements.get(action_name)
    }

    /// Registered action names, sorted.
    pub fn actions(&self) -> Vec<&str> {
        let mut actions: Vec<&str> = self.requirements.keys().map(String::as_str).collect();
        actions.sort_unstable();
        actions
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

/// Built-in requirements, ordered from lowest to highest risk.
///
/// Every action names each of the four standard categories it cares about
/// with a non-zero minimum, so cosine overlap does not punish an identity for
/// being strong in categories a low-risk action barely uses. Risk shows up in
/// the size of the minimums and in `min_sovereignty`, which never decreases
/// along the list.
pub fn default_requirements() -> Vec<PermissionRequirement> {
    vec![
        PermissionRequirement::new("file_write")
            .require("code_quality", 0.4)
            .require("testing", 0.3)
            .require("security", 0.3)
            .require("reliability", 0.3)
            .min_sovereignty(0.2),
        PermissionRequirement::new("git_commit")
            .require("code_quality", 0.5)
            .require("testing", 0.4)
            .require("security", 0.3)
            .require("reliability", 0.3)
            .min_sovereignty(0.3),
        PermissionRequirement::new("git_push")
            .require("code_quality", 0.7)
            .require("testing", 0.6)
            .require("security", 0.5)
            .min_sovereignty(0.7),
        PermissionRequirement::new("database_migration")
            .require("code_quality", 0.5)
            .require("reliability", 0.8)
            .require("security", 0.7)
            .require("testing", 0.7)
            .min_sovereignty(0.7),
        PermissionRequirement::new("force_push")
            .require("code_quality", 0.8)
            .require("reliability", 0.8)
            .require("security", 0.8)
            .require("testing", 0.6)
            .min_sovereignty(0.8),
        PermissionRequirement::new("deploy_production")
            .require("code_quality", 0.8)
            .require("reliability", 0.9)
            .require("security", 0.9)
            .require("testing", 0.8)
            .min_sovereignty(0.8),
    ]
}
