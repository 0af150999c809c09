//! Core types for the category taxonomy.
//!
//! A category carries two identities: a human-legible `code` used only for
//! display and ordering, and an opaque [`StableId`] that every downstream
//! reference (matrix cells, grade records) uses. Rebalancing replaces codes
//! and records but never rewrites a `StableId`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Durable, opaque identity of a category record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(String);

impl StableId {
    /// Allocate a fresh identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier (e.g. read back from history).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single category in the taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Durable identity
    #[serde(default = "StableId::generate")]
    pub stable_id: StableId,
    /// Rank key used for ordering and display (e.g. `A`, `A1`, `B2`)
    pub code: String,
    /// Dimension name (e.g. `security`, `code_quality`)
    pub name: String,
    /// Code of the parent category, if any
    #[serde(default)]
    pub parent_code: Option<String>,
    /// Distance from the root; 0 iff there is no parent
    #[serde(default)]
    pub depth: u32,
    /// Relative importance, must be finite and positive
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Category {
    /// Create a top-level category.
    pub fn root(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            stable_id: StableId::generate(),
            code: code.into(),
            name: name.into(),
            parent_code: None,
            depth: 0,
            weight: default_weight(),
        }
    }

    /// Create a category nested under `parent`.
    pub fn child(parent: &Category, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            stable_id: StableId::generate(),
            code: code.into(),
            name: name.into(),
            parent_code: Some(parent.code.clone()),
            depth: parent.depth + 1,
            weight: default_weight(),
        }
    }

    /// Set the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Lightweight reference used on matrix axes.
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            stable_id: self.stable_id.clone(),
            code: self.code.clone(),
            name: self.name.clone(),
            weight: self.weight,
        }
    }
}

/// Compare two codes by length first, then lexicographically.
pub fn shortlex_cmp(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Axis label for matrices and grade breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub stable_id: StableId,
    pub code: String,
    pub name: String,
    pub weight: f64,
}

/// Lifecycle status of a stored category record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    /// Participates in new matrix builds
    Active,
    /// Retired by a rebalance; still resolvable for historical reads
    Inactive,
}

/// A category as held by the store, with lifecycle metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub category: Category,
    pub status: CategoryStatus,
    /// Taxonomy version in which the record became active
    pub activated_in: u64,
    /// Taxonomy version in which the record was retired
    pub retired_in: Option<u64>,
    pub registered_at: DateTime<Utc>,
    pub retired_at: Option<DateTime<Utc>>,
}

impl CategoryRecord {
    pub fn is_active(&self) -> bool {
        self.status == CategoryStatus::Active
    }
}

/// Kind of change recorded by a rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// New category with no predecessor of the same name
    Added,
    /// Category carried over under a different code
    Recoded,
    /// Category absent from the new set
    Retired,
}

/// History entry written by a rebalance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceEntry {
    pub stable_id_old: Option<StableId>,
    pub stable_id_new: Option<StableId>,
    pub old_code: Option<String>,
    pub new_code: Option<String>,
    pub change: ChangeKind,
    pub reason: String,
    /// Version produced by the rebalance
    pub version: u64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_depth_and_parent() {
        let root = Category::root("A", "security");
        let child = Category::child(&root, "A1", "auth");
        let grandchild = Category::child(&child, "A1a", "tokens");

        assert_eq!(root.depth, 0);
        assert_eq!(child.depth, 1);
        assert_eq!(grandchild.depth, 2);
        assert_eq!(grandchild.parent_code.as_deref(), Some("A1"));
        assert_ne!(root.stable_id, child.stable_id);
    }

    #[test]
    fn test_shortlex_cmp() {
        assert_eq!(shortlex_cmp("B", "A1"), Ordering::Less);
        assert_eq!(shortlex_cmp("A1", "A2"), Ordering::Less);
        assert_eq!(shortlex_cmp("A2", "A2"), Ordering::Equal);
        assert_eq!(shortlex_cmp("Z9", "A"), Ordering::Greater);
    }

    #[test]
    fn test_yaml_defaults() {
        let yaml = "code: A\nname: security\n";
        let category: Category = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(category.depth, 0);
        assert_eq!(category.weight, 1.0);
        assert!(category.parent_code.is_none());
        assert!(!category.stable_id.as_str().is_empty());
    }
}
