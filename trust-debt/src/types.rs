//! Shared types for Trust Debt measurement.

use serde::{Deserialize, Serialize};

/// Which side of the intent/reality divide a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Documentation, design notes and plans
    Intent,
    /// Implementation and commit history
    Reality,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::Reality => "reality",
        }
    }
}

/// Error types for Trust Debt measurement.
#[derive(Debug, thiserror::Error)]
pub enum TrustDebtError {
    /// Scorer returned a negative or non-finite strength
    #[error("Scorer '{scorer}' returned invalid score {value} for category '{code}' in '{source_id}'")]
    InvalidScore {
        scorer: String,
        code: String,
        source_id: String,
        value: f64,
    },

    /// Document weight is negative or non-finite
    #[error("Document '{source_id}' has invalid weight {weight}")]
    InvalidWeight { source_id: String, weight: f64 },

    /// Presence matrices were built over different axes
    #[error("Axis mismatch: {0}")]
    AxisMismatch(String),

    /// Presence matrix passed on the wrong side
    #[error("Expected {expected} presence matrix, got {found}")]
    RoleMismatch { expected: &'static str, found: &'static str },

    /// Presence values are not a square matrix over the axis
    #[error("Presence values must be {size}x{size}")]
    NotSquare { size: usize },

    /// Category index outside the matrix
    #[error("Category index {index} out of range for matrix of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Grade history persistence failed
    #[error("History I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Taxonomy error
    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] taxonomy::TaxonomyError),
}

pub type Result<T> = std::result::Result<T, TrustDebtError>;
