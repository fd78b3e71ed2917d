//! Declarative tool manifest.
//!
//! The manifest is a static file mapping tool names to handler references and
//! an enabled flag. It is loaded exactly once at startup and is immutable
//! afterwards; changing it requires a restart.
//!
//! ```json
//! { "tools": { "kong_create_service": {
//!     "description": "Create a service",
//!     "module": "services",
//!     "function": "create_service",
//!     "enabled": true
//! } } }
//! ```

use crate::error::{Result, ServerError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ToolManifest {
    pub tools: BTreeMap<String, ToolEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolEntry {
    #[serde(default)]
    pub description: Option<String>,
    /// Handler module group (e.g. `services`, `rate_limiting`).
    pub module: String,
    /// Handler function within the module group.
    pub function: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ToolManifest {
    /// Load a manifest from disk. YAML is selected by file extension
    /// (`.yaml`/`.yml`); everything else parses as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Manifest(format!("cannot read {}: {e}", path.display()))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        if is_yaml {
            Ok(serde_yaml::from_str(&raw)?)
        } else {
            Ok(serde_json::from_str(&raw)?)
        }
    }
}
