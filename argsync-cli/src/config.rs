//! Declarative sync configuration loaded from a TOML file
//!
//! ```toml
//! provider_configuration = "pcfg-xxxxxxxx"
//! hostname = "acme.scalr.io"
//!
//! [[argument]]
//! name = "region"
//! value = "us-east-1"
//!
//! [[argument]]
//! name = "api_key"
//! value = "..."
//! sensitive = true
//! description = "service API key"
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use argsync_core::argument::{ArgumentSpec, DesiredSet, desired_set};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate argument name '{0}'")]
    DuplicateArgument(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Id of the provider configuration whose arguments are managed
    pub provider_configuration: String,
    /// Scalr hostname; the --hostname flag and SCALR_HOSTNAME take precedence
    pub hostname: Option<String>,
    #[serde(default, rename = "argument")]
    pub arguments: Vec<ArgumentConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentConfig {
    pub name: String,
    pub value: Option<String>,
    #[serde(default)]
    pub sensitive: bool,
    pub description: Option<String>,
}

impl SyncConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let config: SyncConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: display,
                source,
            })?;

        let mut seen = HashSet::new();
        for argument in &config.arguments {
            if !seen.insert(argument.name.as_str()) {
                return Err(ConfigError::DuplicateArgument(argument.name.clone()));
            }
        }

        Ok(config)
    }

    pub fn desired_set(&self) -> DesiredSet {
        desired_set(self.arguments.iter().map(|a| ArgumentSpec {
            key: a.name.clone(),
            value: a.value.clone(),
            sensitive: a.sensitive,
            description: a.description.clone(),
        }))
    }
}
