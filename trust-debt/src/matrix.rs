//! Presence and Trust Debt matrices.
//!
//! A presence matrix records how strongly each pair of categories co-occurs
//! in one corpus role. The Trust Debt matrix compares the intent and reality
//! presence matrices over the same axis:
//!
//! ```text
//!              col j
//!        ┌──────────────────────┐
//!        │ diag │   upper (i<j) │  upper: reality built it, docs never said so
//! row i  │      │               │
//!        │ lower (i>j)  │  diag │  lower: docs promised it, reality never built it
//!        └──────────────────────┘
//! ```
//!
//! Rows and columns share one axis; values are not mirrored.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use taxonomy::{Category, CategoryRef, CorpusScorer, StableId};

use crate::config::MatrixConfig;
use crate::corpus::{ordered_for_role, CorpusDocument};
use crate::types::{Result, Role, TrustDebtError};

/// Category-by-category presence strengths for one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceMatrix {
    pub role: Role,
    pub axis: Vec<CategoryRef>,
    pub values: Vec<Vec<f64>>,
    /// Number of documents folded in
    pub document_count: usize,
}

impl PresenceMatrix {
    /// All-zero matrix over `axis`.
    pub fn zeros(role: Role, axis: Vec<CategoryRef>) -> Self {
        let n = axis.len();
        Self {
            role,
            axis,
            values: vec![vec![0.0; n]; n],
            document_count: 0,
        }
    }

    /// Wrap precomputed values.
    pub fn from_values(role: Role, axis: Vec<CategoryRef>, values: Vec<Vec<f64>>) -> Result<Self> {
        let n = axis.len();
        if values.len() != n || values.iter().any(|row| row.len() != n) {
            return Err(TrustDebtError::NotSquare { size: n });
        }
        Ok(Self {
            role,
            axis,
            values,
            document_count: 0,
        })
    }

    pub fn size(&self) -> usize {
        self.axis.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().flatten().all(|v| *v == 0.0)
    }
}

/// Position of a cell relative to the diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellRegion {
    Diagonal,
    Upper,
    Lower,
}

impl CellRegion {
    pub fn of(i: usize, j: usize) -> Self {
        match i.cmp(&j) {
            std::cmp::Ordering::Equal => Self::Diagonal,
            std::cmp::Ordering::Less => Self::Upper,
            std::cmp::Ordering::Greater => Self::Lower,
        }
    }
}

/// One Trust Debt cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebtCell {
    pub value: f64,
    pub region: CellRegion,
}

/// Intent-versus-reality divergence over the active category axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustDebtMatrix {
    pub axis: Vec<CategoryRef>,
    pub cells: Vec<Vec<DebtCell>>,
    pub intent_documents: usize,
    pub reality_documents: usize,
    /// Fingerprint of the taxonomy snapshot the axis was taken from
    #[serde(default)]
    pub taxonomy_fingerprint: Option<String>,
}

impl TrustDebtMatrix {
    pub fn size(&self) -> usize {
        self.axis.len()
    }

    pub fn cell(&self, i: usize, j: usize) -> Option<&DebtCell> {
        self.cells.get(i).and_then(|row| row.get(j))
    }

    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.cell(i, j).map(|c| c.value).unwrap_or(0.0)
    }

    /// Set a cell value, keeping its region tag.
    pub fn set_value(&mut self, i: usize, j: usize, value: f64) -> Result<()> {
        let size = self.size();
        let cell = self
            .cells
            .get_mut(i)
            .and_then(|row| row.get_mut(j))
            .ok_or(TrustDebtError::IndexOutOfRange {
                index: i.max(j),
                size,
            })?;
        cell.value = value;
        Ok(())
    }

    /// Cell addressed by the categories' durable identities.
    pub fn cell_by_ids(&self, row: &StableId, column: &StableId) -> Option<&DebtCell> {
        let i = self.index_of(row)?;
        let j = self.index_of(column)?;
        self.cell(i, j)
    }

    pub fn index_of(&self, stable_id: &StableId) -> Option<usize> {
        self.axis.iter().position(|c| &c.stable_id == stable_id)
    }

    /// Tie the matrix to the taxonomy snapshot it was built over.
    pub fn with_taxonomy_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.taxonomy_fingerprint = Some(fingerprint.into());
        self
    }

    pub fn row_labels(&self) -> &[CategoryRef] {
        &self.axis
    }

    pub fn column_labels(&self) -> &[CategoryRef] {
        &self.axis
    }

    /// Iterate `(i, j, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &DebtCell)> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, c)| (i, j, c)))
    }
}

/// Builds presence and Trust Debt matrices.
pub struct MatrixBuilder {
    config: MatrixConfig,
}

impl MatrixBuilder {
    pub fn new(config: MatrixConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    /// Fold every document of `role` into a presence matrix.
    ///
    /// Off-diagonal `[i][j]` accumulates `score_i * score_j * weight`; the
    /// diagonal additionally accumulates `diagonal_self_boost * score_i * weight`.
    /// No documents of `role` yields an all-zero matrix.
    pub fn build_presence_matrix(
        &self,
        role: Role,
        categories: &[Category],
        documents: &[CorpusDocument],
        scorer: &dyn CorpusScorer,
    ) -> Result<PresenceMatrix> {
        let axis: Vec<CategoryRef> = categories.iter().map(Category::to_ref).collect();
        let mut matrix = PresenceMatrix::zeros(role, axis);
        let n = categories.len();

        for doc in ordered_for_role(documents, role) {
            if !doc.weight.is_finite() || doc.weight < 0.0 {
                return Err(TrustDebtError::InvalidWeight {
                    source_id: doc.source_id.clone(),
                    weight: doc.weight,
                });
            }

            let scores = categories
                .iter()
                .map(|c| {
                    let value = scorer.score(c, &doc.text);
                    if value.is_finite() && value >= 0.0 {
                        Ok(value)
                    } else {
                        Err(TrustDebtError::InvalidScore {
                            scorer: scorer.name().to_string(),
                            code: c.code.clone(),
                            source_id: doc.source_id.clone(),
                            value,
                        })
                    }
                })
                .collect::<Result<Vec<f64>>>()?;

            for i in 0..n {
                for j in 0..n {
                    matrix.values[i][j] += scores[i] * scores[j] * doc.weight;
                }
                matrix.values[i][i] += self.config.diagonal_self_boost * scores[i] * doc.weight;
            }
            matrix.document_count += 1;
        }

        debug!(
            role = role.as_str(),
            categories = n,
            documents = matrix.document_count,
            scorer = scorer.name(),
            "Built presence matrix"
        );
        Ok(matrix)
    }

    /// Compare intent and reality presence over the same axis.
    pub fn build_trust_debt_matrix(
        &self,
        intent: &PresenceMatrix,
        reality: &PresenceMatrix,
    ) -> Result<TrustDebtMatrix> {
        if intent.role != Role::Intent {
            return Err(TrustDebtError::RoleMismatch {
                expected: Role::Intent.as_str(),
                found: intent.role.as_str(),
            });
        }
        if reality.role != Role::Reality {
            return Err(TrustDebtError::RoleMismatch {
                expected: Role::Reality.as_str(),
                found: reality.role.as_str(),
            });
        }
        check_same_axis(&intent.axis, &reality.axis)?;

        let n = intent.size();
        let gap = |i: usize, j: usize| (intent.get(i, j) - reality.get(i, j)).abs();

        let cells = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        let region = CellRegion::of(i, j);
                        let value = match region {
                            CellRegion::Diagonal => gap(i, i),
                            CellRegion::Upper => gap(i, j) * self.config.reality_emphasis,
                            CellRegion::Lower => gap(j, i) * self.config.intent_emphasis,
                        };
                        DebtCell { value, region }
                    })
                    .collect()
            })
            .collect();

        if intent.document_count == 0 || reality.document_count == 0 {
            info!(
                intent_documents = intent.document_count,
                reality_documents = reality.document_count,
                "One corpus role is empty; asymmetry recorded as-is"
            );
        }

        Ok(TrustDebtMatrix {
            axis: intent.axis.clone(),
            cells,
            intent_documents: intent.document_count,
            reality_documents: reality.document_count,
            taxonomy_fingerprint: None,
        })
    }
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        Self::new(MatrixConfig::default())
    }
}

fn check_same_axis(a: &[CategoryRef], b: &[CategoryRef]) -> Result<()> {
    if a.len() != b.len() {
        return Err(TrustDebtError::AxisMismatch(format!(
            "{} categories vs {}",
            a.len(),
            b.len()
        )));
    }
    for (position, (x, y)) in a.iter().zip(b).enumerate() {
        if x.stable_id != y.stable_id {
            return Err(TrustDebtError::AxisMismatch(format!(
                "position {position}: '{}' vs '{}'",
                x.code, y.code
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Scores a category by counting its name in the text.
    struct CountScorer;

    impl CorpusScorer for CountScorer {
        fn name(&self) -> &str {
            "count"
        }

        fn score(&self, category: &Category, text: &str) -> f64 {
            text.split_whitespace().filter(|w| *w == category.name).count() as f64
        }
    }

    struct FixedScorer(HashMap<String, f64>);

    impl CorpusScorer for FixedScorer {
        fn name(&self) -> &str {
            "fixed"
        }

        fn score(&self, category: &Category, _text: &str) -> f64 {
            self.0.get(&category.name).copied().unwrap_or(0.0)
        }
    }

    fn categories() -> Vec<Category> {
        vec![
            Category::root("A", "security"),
            Category::root("B", "testing"),
            Category::root("C", "docs"),
        ]
    }

    #[test]
    fn test_presence_formula() {
        let cats = categories();
        let docs = vec![
            CorpusDocument::intent("d1", "security security testing"),
            CorpusDocument::intent("d2", "testing").with_weight(2.0),
            CorpusDocument::reality("r1", "docs"),
        ];
        let m = MatrixBuilder::default()
            .build_presence_matrix(Role::Intent, &cats, &docs, &CountScorer)
            .unwrap();

        assert_eq!(m.document_count, 2);
        // d1: s=2, t=1. d2: t=1 weight 2.
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(1, 0), 2.0);
        assert_eq!(m.get(0, 0), 4.0 + 0.5 * 2.0);
        assert_eq!(m.get(1, 1), 1.0 + 0.5 + 2.0 + 0.5 * 2.0);
        assert_eq!(m.get(2, 2), 0.0);
    }

    #[test]
    fn test_empty_role_is_all_zero() {
        let cats = categories();
        let docs = vec![CorpusDocument::intent("d1", "security")];
        let m = MatrixBuilder::default()
            .build_presence_matrix(Role::Reality, &cats, &docs, &CountScorer)
            .unwrap();
        assert!(m.is_zero());
        assert_eq!(m.size(), 3);
    }

    #[test]
    fn test_negative_score_is_rejected() {
        let cats = categories();
        let docs = vec![CorpusDocument::intent("d1", "anything")];
        let scorer = FixedScorer(HashMap::from([("testing".to_string(), -1.0)]));
        let err = MatrixBuilder::default()
            .build_presence_matrix(Role::Intent, &cats, &docs, &scorer)
            .unwrap_err();
        assert!(matches!(err, TrustDebtError::InvalidScore { .. }));
    }

    #[test]
    fn test_invalid_document_weight() {
        let cats = categories();
        let docs = vec![CorpusDocument::intent("d1", "security").with_weight(f64::NAN)];
        let err = MatrixBuilder::default()
            .build_presence_matrix(Role::Intent, &cats, &docs, &CountScorer)
            .unwrap_err();
        assert!(matches!(err, TrustDebtError::InvalidWeight { .. }));
    }

    #[test]
    fn test_fold_order_is_deterministic() {
        let cats = categories();
        let mut docs = vec![
            CorpusDocument::intent("b", "security testing").with_weight(0.1),
            CorpusDocument::intent("a", "testing docs").with_weight(0.7),
            CorpusDocument::intent("c", "security docs docs").with_weight(0.3),
        ];
        let builder = MatrixBuilder::default();
        let first = builder
            .build_presence_matrix(Role::Intent, &cats, &docs, &CountScorer)
            .unwrap();
        docs.reverse();
        let second = builder
            .build_presence_matrix(Role::Intent, &cats, &docs, &CountScorer)
            .unwrap();
        assert_eq!(first.values, second.values);
    }

    #[test]
    fn test_trust_debt_regions_and_emphasis() {
        let cats = categories();
        let axis: Vec<_> = cats.iter().map(Category::to_ref).collect();
        let intent = PresenceMatrix::from_values(
            Role::Intent,
            axis.clone(),
            vec![
                vec![4.0, 3.0, 0.0],
                vec![3.0, 2.0, 1.0],
                vec![0.0, 1.0, 1.0],
            ],
        )
        .unwrap();
        let reality = PresenceMatrix::from_values(
            Role::Reality,
            axis,
            vec![
                vec![1.0, 1.0, 2.0],
                vec![1.0, 2.0, 1.0],
                vec![2.0, 1.0, 0.0],
            ],
        )
        .unwrap();

        let debt = MatrixBuilder::default()
            .build_trust_debt_matrix(&intent, &reality)
            .unwrap();

        assert_eq!(debt.cell(0, 0).unwrap().region, CellRegion::Diagonal);
        assert_eq!(debt.value(0, 0), 3.0);
        assert_eq!(debt.cell(0, 1).unwrap().region, CellRegion::Upper);
        assert!((debt.value(0, 1) - 2.0 * 1.2).abs() < 1e-12);
        assert_eq!(debt.cell(1, 0).unwrap().region, CellRegion::Lower);
        assert!((debt.value(1, 0) - 2.0 * 0.8).abs() < 1e-12);
        assert_eq!(debt.value(1, 2), 0.0);

        // Same axis on both sides, values differ across the diagonal.
        assert_eq!(debt.row_labels(), debt.column_labels());
        assert_ne!(debt.value(0, 2), debt.value(2, 0));
    }

    #[test]
    fn test_cell_by_ids() {
        let cats = categories();
        let axis: Vec<_> = cats.iter().map(Category::to_ref).collect();
        let intent = PresenceMatrix::zeros(Role::Intent, axis.clone());
        let mut reality = PresenceMatrix::zeros(Role::Reality, axis);
        reality.values[0][2] = 5.0;

        let debt = MatrixBuilder::default()
            .build_trust_debt_matrix(&intent, &reality)
            .unwrap();
        let cell = debt
            .cell_by_ids(&cats[0].stable_id, &cats[2].stable_id)
            .unwrap();
        assert!((cell.value - 6.0).abs() < 1e-12);
        assert!(debt
            .cell_by_ids(&cats[0].stable_id, &StableId::generate())
            .is_none());
    }

    #[test]
    fn test_axis_mismatch() {
        let cats = categories();
        let intent = PresenceMatrix::zeros(Role::Intent, cats.iter().map(Category::to_ref).collect());
        let reality = PresenceMatrix::zeros(
            Role::Reality,
            cats.iter().rev().map(Category::to_ref).collect(),
        );
        assert!(matches!(
            MatrixBuilder::default().build_trust_debt_matrix(&intent, &reality),
            Err(TrustDebtError::AxisMismatch(_))
        ));
    }

    #[test]
    fn test_swapped_roles_rejected() {
        let cats = categories();
        let axis: Vec<_> = cats.iter().map(Category::to_ref).collect();
        let intent = PresenceMatrix::zeros(Role::Intent, axis.clone());
        let reality = PresenceMatrix::zeros(Role::Reality, axis);
        assert!(matches!(
            MatrixBuilder::default().build_trust_debt_matrix(&reality, &intent),
            Err(TrustDebtError::RoleMismatch { .. })
        ));
    }

    #[test]
    fn test_not_square() {
        let cats = categories();
        let axis: Vec<_> = cats.iter().map(Category::to_ref).collect();
        assert!(matches!(
            PresenceMatrix::from_values(Role::Intent, axis, vec![vec![0.0; 3]; 2]),
            Err(TrustDebtError::NotSquare { size: 3 })
        ));
    }
}
