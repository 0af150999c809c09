//! Ordering and structure validation for category sets.
//!
//! A category set is valid when its given order is already ShortLex
//! (shorter codes first, then lexicographic), every parent precedes its
//! children, and depths agree with parent links. Violations are reported,
//! never repaired.

use std::collections::{HashMap, HashSet};

use crate::types::Category;

/// Which rule a category set broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingRule {
    /// A longer code precedes a shorter one
    LengthOrder,
    /// Equal-length codes are out of lexicographic order
    LexicographicOrder,
    /// Same code appears twice
    DuplicateCode,
}

impl OrderingRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LengthOrder => "length-ordering",
            Self::LexicographicOrder => "lexicographic-ordering",
            Self::DuplicateCode => "duplicate-code",
        }
    }
}

/// Validation failure for a category set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Adjacent pair violates ShortLex ordering
    #[error("{} violation at position {position}: '{first}' precedes '{second}'", .rule.as_str())]
    Ordering {
        rule: OrderingRule,
        position: usize,
        first: String,
        second: String,
    },

    /// Parent code does not exist in the set
    #[error("Category '{code}' references unknown parent '{parent}'")]
    UnknownParent { code: String, parent: String },

    /// Parent sorts after its child
    #[error("Parent '{parent}' sorts after its child '{code}'")]
    ParentAfterChild { code: String, parent: String },

    /// Depth disagrees with the parent link
    #[error("depth-parent mismatch for '{code}': expected depth {expected}, found {found}")]
    DepthMismatch {
        code: String,
        expected: u32,
        found: u32,
    },

    /// Stable ID used by two records
    #[error("Duplicate stable id {0}")]
    DuplicateStableId(String),

    /// Name used by two categories
    #[error("Duplicate category name '{0}'")]
    DuplicateName(String),

    /// Weight is not a positive finite number
    #[error("Category '{code}' has invalid weight {weight}")]
    InvalidWeight { code: String, weight: f64 },

    /// Code is blank
    #[error("Category '{0}' has an empty code")]
    EmptyCode(String),
}

/// Validate a full category set in its given order.
pub fn validate_categories(categories: &[Category]) -> Result<(), ValidationError> {
    for category in categories {
        if category.code.trim().is_empty() {
            return Err(ValidationError::EmptyCode(category.name.clone()));
        }
        if !category.weight.is_finite() || category.weight <= 0.0 {
            return Err(ValidationError::InvalidWeight {
                code: category.code.clone(),
                weight: category.weight,
            });
        }
    }

    check_shortlex(categories)?;

    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    for category in categories {
        if !seen_ids.insert(&category.stable_id) {
            return Err(ValidationError::DuplicateStableId(
                category.stable_id.to_string(),
            ));
        }
        if !seen_names.insert(category.name.as_str()) {
            return Err(ValidationError::DuplicateName(category.name.clone()));
        }
    }

    check_hierarchy(categories)
}

/// Check adjacent pairs for ShortLex ordering.
pub fn check_shortlex(categories: &[Category]) -> Result<(), ValidationError> {
    for (position, pair) in categories.windows(2).enumerate() {
        let (a, b) = (&pair[0].code, &pair[1].code);
        let rule = if a.len() > b.len() {
            Some(OrderingRule::LengthOrder)
        } else if a.len() == b.len() && a > b {
            Some(OrderingRule::LexicographicOrder)
        } else if a == b {
            Some(OrderingRule::DuplicateCode)
        } else {
            None
        };

        if let Some(rule) = rule {
            return Err(ValidationError::Ordering {
                rule,
                position,
                first: a.clone(),
                second: b.clone(),
            });
        }
    }
    Ok(())
}

fn check_hierarchy(categories: &[Category]) -> Result<(), ValidationError> {
    let index: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.code.as_str(), i))
        .collect();

    for (position, category) in categories.iter().enumerate() {
        let expected = match &category.parent_code {
            None => 0,
            Some(parent_code) => {
                let parent_pos = *index.get(parent_code.as_str()).ok_or_else(|| {
                    ValidationError::UnknownParent {
                        code: category.code.clone(),
                        parent: parent_code.clone(),
                    }
                })?;
                if parent_pos >= position {
                    return Err(ValidationError::ParentAfterChild {
                        code: category.code.clone(),
                        parent: parent_code.clone(),
                    });
                }
                categories[parent_pos].depth + 1
            }
        };

        if category.depth != expected {
            return Err(ValidationError::DepthMismatch {
                code: category.code.clone(),
                expected,
                found: category.depth,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Category> {
        let a = Category::root("A", "security");
        let b = Category::root("B", "testing");
        let a1 = Category::child(&a, "A1", "auth");
        let b1 = Category::child(&b, "B1", "coverage");
        vec![a, b, a1, b1]
    }

    #[test]
    fn test_valid_set() {
        assert!(validate_categories(&sample()).is_ok());
    }

    #[test]
    fn test_length_violation_reports_pair() {
        let mut set = sample();
        set.swap(1, 2); // A, A1, B, B1
        let err = validate_categories(&set).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Ordering {
                rule: OrderingRule::LengthOrder,
                position: 1,
                first: "A1".to_string(),
                second: "B".to_string(),
            }
        );
    }

    #[test]
    fn test_lexicographic_violation() {
        let mut set = sample();
        set.swap(0, 1);
        match validate_categories(&set).unwrap_err() {
            ValidationError::Ordering { rule, first, .. } => {
                assert_eq!(rule, OrderingRule::LexicographicOrder);
                assert_eq!(first, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_depth_mismatch() {
        let mut set = sample();
        set[2].depth = 3;
        assert!(matches!(
            validate_categories(&set),
            Err(ValidationError::DepthMismatch { expected: 1, found: 3, .. })
        ));
    }

    #[test]
    fn test_root_with_depth_is_rejected() {
        let mut set = sample();
        set[0].depth = 1;
        assert!(matches!(
            validate_categories(&set),
            Err(ValidationError::DepthMismatch { expected: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_parent() {
        let mut set = sample();
        set[3].parent_code = Some("C".to_string());
        assert!(matches!(
            validate_categories(&set),
            Err(ValidationError::UnknownParent { .. })
        ));
    }

    #[test]
    fn test_parent_after_child() {
        // "B1" and "BA" are both length 2; "B1" < "BA" so the child sorts first.
        let b = Category::root("B", "testing");
        let parent = Category::child(&b, "BA", "integration");
        let mut child = Category::child(&parent, "B1", "fixtures");
        child.depth = 2;
        let set = vec![b, child, parent];
        assert!(matches!(
            validate_categories(&set),
            Err(ValidationError::ParentAfterChild { .. })
        ));
    }

    #[test]
    fn test_duplicate_code() {
        let set = vec![Category::root("A", "security"), Category::root("A", "testing")];
        assert!(matches!(
            validate_categories(&set),
            Err(ValidationError::Ordering {
                rule: OrderingRule::DuplicateCode,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_name() {
        let set = vec![Category::root("A", "security"), Category::root("B", "security")];
        assert_eq!(
            validate_categories(&set),
            Err(ValidationError::DuplicateName("security".to_string()))
        );
    }

    #[test]
    fn test_invalid_weight() {
        let set = vec![Category::root("A", "security").with_weight(0.0)];
        assert!(matches!(
            validate_categories(&set),
            Err(ValidationError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_accepted_sets_are_shortlex() {
        let set = sample();
        validate_categories(&set).unwrap();
        for pair in set.windows(2) {
            assert!(pair[0].code.len() <= pair[1].code.len());
            if pair[0].code.len() == pair[1].code.len() {
                assert!(pair[0].code <= pair[1].code);
            }
        }
    }
}
