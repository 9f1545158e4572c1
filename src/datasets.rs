//! Named corpora and the workspace that holds the loaded ones.
//!
//! Five datasets are known by key: `B` (BHSA), `L` (LXX 1935), `D` (Dead Sea
//! Scrolls), `M` (Macula LXX-Link-P) and `N` (Nestle 1904 GNT). Each can be
//! addressed by its key, a long alias (`bhsa`, `lxx`, ...) or one of the short
//! names notebooks used for its accessors (`Fbhs`, `Tbhs`, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{DatasetOverride, ToolsConfig};
use crate::corpus::Corpus;
use crate::db::{load_corpus, load_feature_module, DbError};
use crate::models::VersionInfo;
use crate::refs::Resolver;
use crate::version::version_info;

const CORPUS_FILE: &str = "corpus.db";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Unknown dataset key {0:?}. Use B/L/M/D/N (or BHSA/LXX/MACULA/DSS/GNT).")]
    UnknownDataset(String),
    #[error("Dataset {0:?} not loaded")]
    NotLoaded(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatasetKey {
    B,
    L,
    D,
    M,
    N,
}

impl DatasetKey {
    pub const ALL: [DatasetKey; 5] = [
        DatasetKey::B,
        DatasetKey::L,
        DatasetKey::D,
        DatasetKey::M,
        DatasetKey::N,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKey::B => "B",
            DatasetKey::L => "L",
            DatasetKey::D => "D",
            DatasetKey::M => "M",
            DatasetKey::N => "N",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            DatasetKey::B => &["b", "bhsa", "bhs"],
            DatasetKey::L => &["l", "lxx"],
            DatasetKey::D => &["d", "dss"],
            DatasetKey::M => &["m", "macula"],
            DatasetKey::N => &["n", "gnt", "n1904"],
        }
    }

    /// Resolve a key, alias or short accessor name, case-insensitively
    pub fn lookup(name: &str) -> Option<DatasetKey> {
        let wanted = name.trim().to_lowercase();
        DatasetKey::ALL.into_iter().find(|key| {
            key.aliases().contains(&wanted.as_str())
                || default_spec(*key)
                    .hoist_names
                    .iter()
                    .any(|n| n.to_lowercase() == wanted)
        })
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a dataset comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Repository-style name, e.g. `etcbc/bhsa`
    pub spec: String,
    pub version: Option<String>,
    /// Extra feature module layered over the corpus
    pub module: Option<String>,
    pub hoist_names: Vec<String>,
    /// Explicit corpus file
    pub path: Option<PathBuf>,
}

impl DatasetSpec {
    fn new(spec: &str, version: &str, module: Option<&str>, hoist_names: &[&str]) -> Self {
        Self {
            spec: spec.to_string(),
            version: Some(version.to_string()),
            module: module.map(str::to_string),
            hoist_names: hoist_names.iter().map(|s| s.to_string()).collect(),
            path: None,
        }
    }

    pub fn with_override(&self, o: &DatasetOverride) -> Self {
        Self {
            spec: o.spec.clone().unwrap_or_else(|| self.spec.clone()),
            version: o.version.clone().or_else(|| self.version.clone()),
            module: o.module.clone().or_else(|| self.module.clone()),
            hoist_names: self.hoist_names.clone(),
            path: o.path.clone().or_else(|| self.path.clone()),
        }
    }

    fn version_dir(&self) -> &str {
        self.version.as_deref().unwrap_or("latest")
    }

    /// `<data_dir>/<spec>/<version>/corpus.db` unless an explicit path is set
    pub fn corpus_path(&self, data_dir: &Path) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => data_dir
                .join(&self.spec)
                .join(self.version_dir())
                .join(CORPUS_FILE),
        }
    }

    /// `<data_dir>/<module>/<version>/corpus.db`
    pub fn module_path(&self, data_dir: &Path) -> Option<PathBuf> {
        let module = self.module.as_deref()?.trim_end_matches('/');
        Some(data_dir.join(module).join(self.version_dir()).join(CORPUS_FILE))
    }
}

/// Built-in spec for a dataset key
pub fn default_spec(key: DatasetKey) -> DatasetSpec {
    match key {
        DatasetKey::B => DatasetSpec::new(
            "etcbc/bhsa",
            "2021",
            Some("CenterBLC/BHSaddons/tf"),
            &["Fbhs", "Lbhs", "Tbhs", "Sbhs"],
        ),
        DatasetKey::L => {
            DatasetSpec::new("CenterBLC/LXX", "1935", None, &["Flxx", "Llxx", "Tlxx", "Slxx"])
        }
        DatasetKey::D => {
            DatasetSpec::new("etcbc/dss", "1.9", None, &["Fdss", "Ldss", "Tdss", "Sdss"])
        }
        DatasetKey::M => DatasetSpec::new("sergpanf/LXX-Link-P", "0.0.8", None, &["Fhb", "Lhb", "Thb"]),
        DatasetKey::N => DatasetSpec::new(
            "CenterBLC/N1904",
            "1.0.0",
            Some("CenterBLC/N1904/BOLcomplement/tf/"),
            &["Fgnt", "Lgnt", "Tgnt", "Sgnt"],
        ),
    }
}

/// A corpus that has been loaded and registered
pub struct LoadedDataset {
    pub key: DatasetKey,
    pub spec: DatasetSpec,
    pub resolver: Resolver<Corpus>,
}

impl LoadedDataset {
    pub fn corpus(&self) -> &Corpus {
        self.resolver.corpus()
    }

    pub fn version(&self) -> VersionInfo {
        version_info(self.corpus())
    }
}

/// Registry of loaded corpora, standing in for a notebook namespace
pub struct Workspace {
    config: ToolsConfig,
    loaded: BTreeMap<DatasetKey, LoadedDataset>,
}

impl Workspace {
    pub fn new(config: ToolsConfig) -> Self {
        Self {
            config,
            loaded: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    /// Default spec merged with any config override for this key
    pub fn spec_for(&self, key: DatasetKey) -> DatasetSpec {
        let base = default_spec(key);
        self.config
            .datasets
            .iter()
            .filter(|(name, _)| DatasetKey::lookup(name) == Some(key))
            .fold(base, |spec, (_, o)| spec.with_override(o))
    }

    /// Register an already built corpus under `key`.
    pub fn insert(&mut self, key: DatasetKey, spec: DatasetSpec, corpus: Corpus) -> &LoadedDataset {
        self.loaded.insert(
            key,
            LoadedDataset {
                key,
                spec,
                resolver: Resolver::new(corpus),
            },
        );
        &self.loaded[&key]
    }

    /// Load one dataset from disk; `spec` replaces the configured one.
    pub fn load_one(
        &mut self,
        key: DatasetKey,
        spec: Option<DatasetSpec>,
    ) -> Result<&LoadedDataset, DatasetError> {
        let spec = spec.unwrap_or_else(|| self.spec_for(key));
        let verbose = self.config.verbose;
        let path = spec.corpus_path(&self.config.data_dir);

        if verbose {
            eprintln!(
                "Loading {}: {} (version={}, module={})",
                key,
                spec.spec,
                spec.version.as_deref().unwrap_or("-"),
                spec.module.as_deref().unwrap_or("-"),
            );
        }
        let mut corpus = load_corpus(&path, verbose)?;

        if let Some(module_path) = spec.module_path(&self.config.data_dir) {
            if module_path.exists() {
                load_feature_module(&mut corpus, &module_path)?;
            } else {
                tracing::warn!(path = %module_path.display(), "feature module not found, skipping");
            }
        }

        Ok(self.insert(key, spec, corpus))
    }

    /// Load several datasets in order and return the keys that were loaded.
    pub fn load_defaults(&mut self, which: &[DatasetKey]) -> Result<Vec<DatasetKey>, DatasetError> {
        for &key in which {
            self.load_one(key, None)?;
        }
        Ok(which.to_vec())
    }

    /// A loaded dataset by key, alias or short name
    pub fn dataset(&self, name: &str) -> Result<&LoadedDataset, DatasetError> {
        let key = DatasetKey::lookup(name)
            .ok_or_else(|| DatasetError::UnknownDataset(name.to_string()))?;
        self.loaded
            .get(&key)
            .ok_or_else(|| DatasetError::NotLoaded(name.to_string()))
    }

    pub fn loaded_keys(&self) -> Vec<DatasetKey> {
        self.loaded.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusBuilder;

    fn tiny() -> Corpus {
        let mut b = CorpusBuilder::new();
        b.book("Genesis");
        b.simple_chapter(1, 2);
        b.build()
    }

    #[test]
    fn test_key_lookup() {
        assert_eq!(DatasetKey::lookup("bhsa"), Some(DatasetKey::B));
        assert_eq!(DatasetKey::lookup("N1904"), Some(DatasetKey::N));
        assert_eq!(DatasetKey::lookup("Tlxx"), Some(DatasetKey::L));
        assert_eq!(DatasetKey::lookup(" m "), Some(DatasetKey::M));
        assert_eq!(DatasetKey::lookup("vulgate"), None);
    }

    #[test]
    fn test_corpus_paths() {
        let spec = default_spec(DatasetKey::B);
        let dir = Path::new("/tf");
        assert_eq!(
            spec.corpus_path(dir),
            PathBuf::from("/tf/etcbc/bhsa/2021/corpus.db")
        );
        assert_eq!(
            spec.module_path(dir),
            Some(PathBuf::from("/tf/CenterBLC/BHSaddons/tf/2021/corpus.db"))
        );
        assert_eq!(default_spec(DatasetKey::L).module_path(dir), None);
    }

    #[test]
    fn test_config_override_by_alias() {
        let mut config = ToolsConfig::default();
        config.datasets.insert(
            "bhsa".to_string(),
            DatasetOverride {
                version: Some("2023".to_string()),
                ..Default::default()
            },
        );
        let ws = Workspace::new(config);
        let spec = ws.spec_for(DatasetKey::B);
        assert_eq!(spec.version.as_deref(), Some("2023"));
        assert_eq!(spec.spec, "etcbc/bhsa");
        assert_eq!(ws.spec_for(DatasetKey::L), default_spec(DatasetKey::L));
    }

    #[test]
    fn test_unknown_vs_not_loaded() {
        let mut ws = Workspace::new(ToolsConfig::default());
        assert!(matches!(ws.dataset("zz"), Err(DatasetError::UnknownDataset(_))));
        assert!(matches!(ws.dataset("B"), Err(DatasetError::NotLoaded(_))));

        ws.insert(DatasetKey::B, default_spec(DatasetKey::B), tiny());
        assert_eq!(ws.dataset("Tbhs").unwrap().key, DatasetKey::B);
        assert_eq!(ws.loaded_keys(), vec![DatasetKey::B]);
    }

    #[test]
    fn test_load_one_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.db");
        crate::db::write_corpus(&tiny(), &path).unwrap();

        let mut config = ToolsConfig::default();
        config.verbose = false;
        config.data_dir = dir.path().to_path_buf();
        config.datasets.insert(
            "B".to_string(),
            DatasetOverride {
                path: Some(path),
                ..Default::default()
            },
        );

        let mut ws = Workspace::new(config);
        let loaded = ws.load_one(DatasetKey::B, None).unwrap();
        assert_eq!(loaded.corpus().node_count(), 6);
    }

    #[test]
    fn test_load_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ToolsConfig::default();
        config.verbose = false;
        config.data_dir = dir.path().to_path_buf();
        let mut ws = Workspace::new(config);
        assert!(matches!(
            ws.load_defaults(&[DatasetKey::D]),
            Err(DatasetError::Db(DbError::MissingCorpus(_)))
        ));
    }
}
