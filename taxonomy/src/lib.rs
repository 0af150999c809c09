//! Category taxonomy for Trust Debt measurement.
//!
//! Categories are the axes of every presence and Trust Debt matrix. This
//! crate owns their ordering rules and lifecycle:
//!
//! - **ShortLex ordering**: shorter codes before longer ones, then
//!   lexicographic; parents before children; depth consistent with parents
//! - **Stable identity**: matrix cells reference [`StableId`]s, never codes
//! - **Rebalance**: the active set is swapped atomically; retired records stay
//!   resolvable for historical reads
//! - **Orthogonality**: advisory correlation report between categories
//!
//! # Example
//!
//! ```ignore
//! use taxonomy::{Category, TaxonomyStore};
//!
//! let store = TaxonomyStore::new();
//! let security = Category::root("A", "security");
//! let auth = Category::child(&security, "A1", "auth");
//! store.register(vec![security, auth]).await?;
//!
//! let snapshot = store.snapshot().await;
//! ```

pub mod orthogonality;
pub mod scorer;
pub mod store;
pub mod types;
pub mod validation;

// Re-export main types
pub use orthogonality::{validate_orthogonality, OrthogonalityReport, DEFAULT_CORRELATION_CEILING};
pub use scorer::{CorpusScorer, KeywordScorer, KeywordTable};
pub use store::{RebalanceResult, TaxonomyError, TaxonomySnapshot, TaxonomyStore};
pub use types::*;
pub use validation::{validate_categories, OrderingRule, ValidationError};
