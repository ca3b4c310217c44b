use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use consent_flow::FlowConfig;

/// Engine configuration: flow timing bounds plus the provider catalog
/// source. Loadable from a YAML file; everything has a usable default.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub flow: FlowConfig,
    /// Path to a provider signature catalog. `None` uses the built-in
    /// catalog.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("failed to parse engine configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_fields_are_absent() {
        let config = EngineConfig::from_yaml_str("flow:\n  settle_ms: 250\n").unwrap();
        assert_eq!(config.flow.settle_ms, 250);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn empty_document_is_a_valid_config() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.flow.nav_timeout_ms, FlowConfig::default().nav_timeout_ms);
    }
}
