//! TOML configuration: where corpora live and per-dataset overrides.
//!
//! ```toml
//! data_dir = "/home/me/text-fabric-data"
//! verbose = false
//!
//! [datasets.B]
//! version = "2023"
//!
//! [datasets.dss]
//! path = "/data/dss/corpus.db"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the default data directory
pub const DATA_DIR_ENV: &str = "TFTOOLS_DATA_DIR";

const DEFAULT_DATA_DIR: &str = "text-fabric-data";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Per-dataset replacement of any part of the default spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetOverride {
    pub spec: Option<String>,
    pub version: Option<String>,
    pub module: Option<String>,
    /// Explicit corpus file, bypassing `data_dir` layout
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub data_dir: PathBuf,
    pub verbose: bool,
    /// Keyed by dataset key, alias or short name (`B`, `bhsa`, `Tbhs`, ...)
    pub datasets: BTreeMap<String, DatasetOverride>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Self {
            data_dir,
            verbose: true,
            datasets: BTreeMap::new(),
        }
    }
}

impl ToolsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), datasets = config.datasets.len(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let config = ToolsConfig::from_toml_str(
            r#"
            data_dir = "/srv/tf"
            verbose = false

            [datasets.B]
            version = "2023"

            [datasets.dss]
            path = "/data/dss.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/tf"));
        assert!(!config.verbose);
        assert_eq!(config.datasets["B"].version.as_deref(), Some("2023"));
        assert_eq!(config.datasets["B"].spec, None);
        assert_eq!(
            config.datasets["dss"].path.as_deref(),
            Some(Path::new("/data/dss.db"))
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ToolsConfig::from_toml_str("").unwrap();
        assert!(config.verbose);
        assert!(config.datasets.is_empty());
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            ToolsConfig::from_toml_str("data_dir = ["),
            Err(ConfigError::Toml(_))
        ));
    }
}
