//! Settings file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use permission::PermissionConfig;
use trust_debt::TrustDebtConfig;

/// Combined settings for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub trust_debt: TrustDebtConfig,
    pub permission: PermissionConfig,
}

impl Settings {
    /// Read settings from a YAML file, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let settings = match path {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)
                    .with_context(|| format!("reading settings {}", path.display()))?;
                Self::from_yaml(&yaml)
                    .with_context(|| format!("parsing settings {}", path.display()))?
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.trust_debt.validate()?;
        self.permission.validate()?;
        Ok(())
    }
}
