//! Configuration for Trust Debt measurement.

use serde::{Deserialize, Serialize};

use crate::grading::GradeBands;
use crate::types::{Result, TrustDebtError};

/// Configuration for a measurement run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustDebtConfig {
    /// Taxonomy checks
    pub taxonomy: TaxonomyConfig,
    /// Matrix construction
    pub matrix: MatrixConfig,
    /// Grading
    pub grading: GradingConfig,
}

impl TrustDebtConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.taxonomy.validate()?;
        self.matrix.validate()?;
        self.grading.validate()
    }
}

/// Taxonomy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Absolute correlation above which a category pair is flagged
    pub correlation_ceiling: f64,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            correlation_ceiling: taxonomy::DEFAULT_CORRELATION_CEILING,
        }
    }
}

impl TaxonomyConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.correlation_ceiling) {
            return Err(TrustDebtError::ConfigError(format!(
                "correlation_ceiling must be within [0, 1], got {}",
                self.correlation_ceiling
            )));
        }
        Ok(())
    }
}

/// Matrix construction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Scale on upper cells (undocumented coupling)
    pub reality_emphasis: f64,
    /// Scale on lower cells (broken promises)
    pub intent_emphasis: f64,
    /// Diagonal self-coherence term per unit of score
    pub diagonal_self_boost: f64,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            reality_emphasis: 1.2,
            intent_emphasis: 0.8,
            diagonal_self_boost: 0.5,
        }
    }
}

impl MatrixConfig {
    /// Emphasis factors must be positive and distinct.
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("reality_emphasis", self.reality_emphasis),
            ("intent_emphasis", self.intent_emphasis),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrustDebtError::ConfigError(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        if self.reality_emphasis == self.intent_emphasis {
            return Err(TrustDebtError::ConfigError(format!(
                "reality_emphasis and intent_emphasis must differ, both are {}",
                self.reality_emphasis
            )));
        }
        if !self.diagonal_self_boost.is_finite() || self.diagonal_self_boost < 0.0 {
            return Err(TrustDebtError::ConfigError(format!(
                "diagonal_self_boost must be finite and non-negative, got {}",
                self.diagonal_self_boost
            )));
        }
        Ok(())
    }
}

/// Grading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Letter grade boundaries
    pub bands: GradeBands,
    /// Per-category debt at which health drops to 0.5
    pub health_half_debt: f64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            bands: GradeBands::default(),
            health_half_debt: 100.0,
        }
    }
}

impl GradingConfig {
    fn validate(&self) -> Result<()> {
        self.bands.validate()?;
        if !self.health_half_debt.is_finite() || self.health_half_debt <= 0.0 {
            return Err(TrustDebtError::ConfigError(format!(
                "health_half_debt must be finite and positive, got {}",
                self.health_half_debt
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrustDebtConfig::default();
        assert_eq!(config.grading.bands.a_max, 500.0);
        assert_eq!(config.matrix.diagonal_self_boost, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = TrustDebtConfig::default();
        config.grading.bands.c_max = 4000.0;
        let yaml = config.to_yaml().unwrap();
        let parsed = TrustDebtConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.grading.bands.c_max, 4000.0);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let parsed = TrustDebtConfig::from_yaml("matrix:\n  intent_emphasis: 1.5\n").unwrap();
        assert_eq!(parsed.matrix.intent_emphasis, 1.5);
        assert_eq!(parsed.matrix.reality_emphasis, 1.2);
        assert_eq!(parsed.grading.bands.b_max, 1500.0);
    }

    #[test]
    fn test_rejects_negative_emphasis() {
        let mut config = TrustDebtConfig::default();
        config.matrix.reality_emphasis = -1.0;
        assert!(matches!(
            config.validate(),
            Err(TrustDebtError::ConfigError(_))
        ));
    }

    #[test]
    fn test_rejects_zero_emphasis() {
        let mut config = TrustDebtConfig::default();
        config.matrix.intent_emphasis = 0.0;
        assert!(config.validate().is_err());

        config.matrix.intent_emphasis = 0.8;
        config.matrix.reality_emphasis = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_equal_emphasis() {
        let mut config = TrustDebtConfig::default();
        config.matrix.reality_emphasis = 1.0;
        config.matrix.intent_emphasis = 1.0;
        assert!(matches!(
            config.validate(),
            Err(TrustDebtError::ConfigError(_))
        ));

        config.matrix.intent_emphasis = 0.9;
        assert!(config.validate().is_ok());
    }
}
