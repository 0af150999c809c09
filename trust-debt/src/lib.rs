//! Trust Debt measurement.
//!
//! Measures the divergence between what a project says (intent corpus) and
//! what it does (reality corpus) over an ordered category taxonomy:
//!
//! - **Presence matrices**: per-role category co-occurrence strengths
//! - **Trust Debt matrix**: axis-symmetric, value-asymmetric divergence
//! - **Grading**: additive total units, configurable letter bands,
//!   per-category health
//! - **History**: append-only grade timeline with trend
//!
//! # Architecture
//!
//! ```text
//! TaxonomySnapshot ─┐
//! Intent docs ──────┼─► PresenceMatrix ×2 ─► TrustDebtMatrix ─► GradeRecord ─► GradeHistory
//! Reality docs ─────┘        (CorpusScorer)
//! ```

pub mod config;
pub mod corpus;
pub mod grading;
pub mod history;
pub mod matrix;
pub mod pipeline;
pub mod types;

// Re-export main types
pub use config::{GradingConfig, MatrixConfig, TaxonomyConfig, TrustDebtConfig};
pub use corpus::CorpusDocument;
pub use grading::{
    category_debt, per_category_score, sum_triangles, CategoryHealth, Grade, GradeBands,
    GradeRecord, GradingEngine, TriangleSums,
};
pub use history::{GradeHistory, TimelinePoint, Trend, TrendDirection};
pub use matrix::{CellRegion, DebtCell, MatrixBuilder, PresenceMatrix, TrustDebtMatrix};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use types::*;
