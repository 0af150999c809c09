//! Shared types for the permission engine.

use serde::{Deserialize, Serialize};

/// How identity/requirement overlap is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMode {
    /// Cosine similarity of the projected vectors, clamped to `[0, 1]`
    #[default]
    Cosine,
    /// Fraction of required categories individually met
    Threshold,
}

impl OverlapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Threshold => "threshold",
        }
    }
}

/// Why a decision was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// Overlap fell short of the threshold
    OverlapBelowThreshold,
    /// Sovereignty fell short of the requirement's minimum
    SovereigntyBelowMinimum,
}

/// Error types for the permission engine.
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    /// No requirement registered for the action
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// No identity vector for the subject
    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// YAML parsing failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PermissionError>;
