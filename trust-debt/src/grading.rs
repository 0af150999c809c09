//! Grading of Trust Debt matrices.
//!
//! Total debt is the additive sum of all three regions. A signed
//! `|upper - lower|` difference would report zero for two mirrored failures,
//! so it is never used as the total.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use taxonomy::{StableId, TaxonomySnapshot};

use crate::config::GradingConfig;
use crate::matrix::{CellRegion, TrustDebtMatrix};
use crate::types::{Result, TrustDebtError};

/// Letter grade, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// True if `self` is a better grade than `other`.
    pub fn is_better_than(&self, other: &Self) -> bool {
        self < other
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds (inclusive) for grades A to C; anything above `c_max` is D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeBands {
    pub a_max: f64,
    pub b_max: f64,
    pub c_max: f64,
}

impl Default for GradeBands {
    fn default() -> Self {
        Self {
            a_max: 500.0,
            b_max: 1500.0,
            c_max: 3000.0,
        }
    }
}

impl GradeBands {
    pub fn validate(&self) -> Result<()> {
        let bounds = [self.a_max, self.b_max, self.c_max];
        if bounds.iter().any(|b| !b.is_finite() || *b < 0.0) {
            return Err(TrustDebtError::ConfigError(
                "grade bands must be finite and non-negative".to_string(),
            ));
        }
        if !(self.a_max < self.b_max && self.b_max < self.c_max) {
            return Err(TrustDebtError::ConfigError(format!(
                "grade bands must be strictly ascending, got {}/{}/{}",
                self.a_max, self.b_max, self.c_max
            )));
        }
        Ok(())
    }

    pub fn classify(&self, total_units: f64) -> Grade {
        if total_units <= self.a_max {
            Grade::A
        } else if total_units <= self.b_max {
            Grade::B
        } else if total_units <= self.c_max {
            Grade::C
        } else {
            Grade::D
        }
    }
}

/// Region sums of a Trust Debt matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangleSums {
    pub upper_sum: f64,
    pub lower_sum: f64,
    pub diagonal_sum: f64,
    pub total_units: f64,
}

/// Sum each region; `total_units` is their plain sum.
pub fn sum_triangles(matrix: &TrustDebtMatrix) -> TriangleSums {
    let mut upper_sum = 0.0;
    let mut lower_sum = 0.0;
    let mut diagonal_sum = 0.0;
    for (_, _, cell) in matrix.iter() {
        match cell.region {
            CellRegion::Upper => upper_sum += cell.value,
            CellRegion::Lower => lower_sum += cell.value,
            CellRegion::Diagonal => diagonal_sum += cell.value,
        }
    }
    TriangleSums {
        upper_sum,
        lower_sum,
        diagonal_sum,
        total_units: upper_sum + lower_sum + diagonal_sum,
    }
}

/// Debt attributable to one category: its row plus its column, diagonal counted once.
pub fn category_debt(matrix: &TrustDebtMatrix, index: usize) -> Result<f64> {
    let size = matrix.size();
    if index >= size {
        return Err(TrustDebtError::IndexOutOfRange { index, size });
    }
    let row: f64 = (0..size).map(|j| matrix.value(index, j)).sum();
    let column: f64 = (0..size).map(|i| matrix.value(i, index)).sum();
    Ok(row + column - matrix.value(index, index))
}

/// Health in `[0, 1]`: `half_debt / (half_debt + debt)`.
pub fn per_category_score(matrix: &TrustDebtMatrix, index: usize, half_debt: f64) -> Result<f64> {
    let debt = category_debt(matrix, index)?;
    Ok(health_from_debt(debt, half_debt))
}

fn health_from_debt(debt: f64, half_debt: f64) -> f64 {
    let debt = debt.max(0.0);
    (half_debt / (half_debt + debt)).clamp(0.0, 1.0)
}

/// Per-category slice of a grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryHealth {
    pub stable_id: StableId,
    pub code: String,
    pub name: String,
    pub weight: f64,
    pub debt: f64,
    /// Health in `[0, 1]`, 1 at zero debt
    pub score: f64,
}

/// Result of grading one run. Immutable once appended to history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRecord {
    pub id: String,
    pub total_units: f64,
    pub grade: Grade,
    pub upper_sum: f64,
    pub lower_sum: f64,
    pub diagonal_sum: f64,
    pub category_health: Vec<CategoryHealth>,
    pub taxonomy_version: u64,
    pub taxonomy_fingerprint: Option<String>,
    pub computed_at: DateTime<Utc>,
}

impl GradeRecord {
    /// Attach the taxonomy the matrix was built from.
    pub fn with_taxonomy(mut self, snapshot: &TaxonomySnapshot) -> Self {
        self.taxonomy_version = snapshot.version;
        self.taxonomy_fingerprint = Some(snapshot.fingerprint.clone());
        self
    }

    pub fn health_of(&self, name: &str) -> Option<&CategoryHealth> {
        self.category_health.iter().find(|h| h.name == name)
    }

    pub fn sums(&self) -> TriangleSums {
        TriangleSums {
            upper_sum: self.upper_sum,
            lower_sum: self.lower_sum,
            diagonal_sum: self.diagonal_sum,
            total_units: self.total_units,
        }
    }
}

/// Reduces Trust Debt matrices to grades.
pub struct GradingEngine {
    config: GradingConfig,
}

impl GradingEngine {
    pub fn new(config: GradingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    pub fn classify(&self, total_units: f64) -> Grade {
        self.config.bands.classify(total_units)
    }

    pub fn per_category_score(&self, matrix: &TrustDebtMatrix, index: usize) -> Result<f64> {
        per_category_score(matrix, index, self.config.health_half_debt)
    }

    /// Grade a matrix.
    pub fn grade(&self, matrix: &TrustDebtMatrix) -> Result<GradeRecord> {
        let sums = sum_triangles(matrix);
        let grade = self.classify(sums.total_units);

        let category_health = matrix
            .axis
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let debt = category_debt(matrix, i)?;
                Ok(CategoryHealth {
                    stable_id: category.stable_id.clone(),
                    code: category.code.clone(),
                    name: category.name.clone(),
                    weight: category.weight,
                    debt,
                    score: health_from_debt(debt, self.config.health_half_debt),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            total_units = sums.total_units,
            upper = sums.upper_sum,
            lower = sums.lower_sum,
            diagonal = sums.diagonal_sum,
            grade = %grade,
            "Graded Trust Debt matrix"
        );

        Ok(GradeRecord {
            id: uuid::Uuid::new_v4().to_string(),
            total_units: sums.total_units,
            grade,
            upper_sum: sums.upper_sum,
            lower_sum: sums.lower_sum,
            diagonal_sum: sums.diagonal_sum,
            category_health,
            taxonomy_version: 0,
            taxonomy_fingerprint: None,
            computed_at: Utc::now(),
        })
    }
}

impl Default for GradingEngine {
    fn default() -> Self {
        Self::new(GradingConfig::default())
    }
}
