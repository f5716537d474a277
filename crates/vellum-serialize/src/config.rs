//! # Engine Configuration
//!
//! [`EngineConfig`] carries the settings that shape schema trees: the depth
//! ceiling, the fallback group and the global naming conventions. It is
//! plain serde data, loadable from YAML or JSON; every key is optional.
//!
//! ```yaml
//! max_depth: 10
//! default_group: default
//! input_mapper: snake
//! output_mapper: camel
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use vellum_core::{MapperKind, VellumError, DEFAULT_GROUP};

use crate::builder::DEFAULT_MAX_DEPTH;

/// Settings of an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum nesting depth of structured types.
    pub max_depth: usize,
    /// Group of fields and classes that declare none.
    pub default_group: String,
    /// Naming convention for payload keys, unless a field says otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_mapper: Option<MapperKind>,
    /// Naming convention for output keys, unless a field says otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_mapper: Option<MapperKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_group: DEFAULT_GROUP.to_string(),
            input_mapper: None,
            output_mapper: None,
        }
    }
}

impl EngineConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(source: &str) -> Result<Self, VellumError> {
        let config: Self = serde_yaml::from_str(source)
            .map_err(|e| VellumError::Config(format!("invalid YAML configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self, VellumError> {
        let config: Self = serde_json::from_str(source)
            .map_err(|e| VellumError::Config(format!("invalid JSON configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self, VellumError> {
        let config: Self = load_document(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no engine can work with.
    pub fn validate(&self) -> Result<(), VellumError> {
        if self.default_group.trim().is_empty() {
            return Err(VellumError::Config(
                "default_group must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deserialize a YAML or JSON file, chosen by extension. Files without a
/// `.json` extension are read as YAML.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, VellumError> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content)
            .map_err(|e| VellumError::Config(format!("{}: {e}", path.display())))
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| VellumError::Config(format!("{}: {e}", path.display())))
    }
}
