//! Verifier configuration
//!
//! Controls the reconciliation policy. Can be built in code or loaded from a
//! `mapassert.yaml` file:
//!
//! ```yaml
//! version: 1
//! verification:
//!   require_complete: true
//!   equivalence: strict
//!   probe_samples: false
//! ```

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "mapassert.yaml";

/// How two transform probe outcomes are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EquivalencePolicy {
    /// Both succeed and return equal values
    #[default]
    Strict,
    /// Both succeed, whatever they return
    Lenient,
}

/// Reconciliation policy
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerifierConfig {
    /// Fail when the mapping registers transformations no assertion covers
    #[serde(default = "default_true")]
    pub require_complete: bool,

    /// Comparison applied to transform probe outcomes
    #[serde(default)]
    pub equivalence: EquivalencePolicy,

    /// Also probe with a representative non-null value of the source type
    #[serde(default)]
    pub probe_samples: bool,
}

fn default_true() -> bool {
    true
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            require_complete: true,
            equivalence: EquivalencePolicy::Strict,
            probe_samples: false,
        }
    }
}

impl VerifierConfig {
    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Project configuration file (`mapassert.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "mapassert config", description = "Mapping verification settings")]
pub struct ProjectConfig {
    /// Schema version for migrations
    pub version: u32,

    /// Verification policy
    #[serde(default)]
    pub verification: VerifierConfig,
}

impl ProjectConfig {
    /// Load `mapassert.yaml` from a directory, `None` if absent
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let file = dir.join(CONFIG_FILE);
        if !file.exists() {
            return Ok(None);
        }
        Self::load_from_file(&file).map(Some)
    }

    /// Load a configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let config: ProjectConfig = serde_norway::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        if config.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported {} version: {}",
                CONFIG_FILE, config.version
            )));
        }

        Ok(config)
    }
}

/// JSON Schema of the project configuration file
pub fn config_schema() -> Result<String> {
    let schema = schemars::schema_for!(ProjectConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}
