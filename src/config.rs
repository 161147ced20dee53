//! Configuration - JSON File With Defaults for Every Key
//!
//! ```json
//! {
//!   "logLevel": "debug",
//!   "resetOnSuccess": true,
//!   "signature": { "name": "Dana Ruiz", "department": "Acquisitions" },
//!   "catalogs": { "agents": [{ "value": "agent4", "label": "Ada Park" }] }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalogs, OptionItem};
use crate::notification::Signature;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown catalog: {0}")]
    UnknownCatalog(String),

    #[error("Catalog {0} is fixed and cannot be overridden")]
    FixedCatalog(String),

    #[error("Catalog {0} must have at least one option")]
    EmptyCatalog(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormsConfig {
    pub log_level: String,
    pub reset_on_success: bool,
    pub signature: Signature,
    pub catalogs: IndexMap<String, Vec<OptionItem>>,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            reset_on_success: false,
            signature: Signature::default(),
            catalogs: IndexMap::new(),
        }
    }
}

impl FormsConfig {
    /// Load from a file; no path means defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content)?;
        config.catalogs()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Built-in catalogs with this config's overrides applied
    pub fn catalogs(&self) -> Result<Catalogs, ConfigError> {
        let mut catalogs = Catalogs::default();
        for (name, options) in &self.catalogs {
            if Catalogs::is_fixed(name) {
                return Err(ConfigError::FixedCatalog(name.clone()));
            }
            if options.is_empty() {
                return Err(ConfigError::EmptyCatalog(name.clone()));
            }
            if !catalogs.override_options(name, options.clone()) {
                return Err(ConfigError::UnknownCatalog(name.clone()));
            }
        }
        Ok(catalogs)
    }
}
