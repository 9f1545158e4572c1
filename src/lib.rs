//! tftools: biblical book names and verse references over Text-Fabric style corpora
//!
//! Normalizes book names from many conventions (SBL abbreviations, BHSA
//! Latin labels, full English names, roman-numeral prefixes, typos) to one
//! canonical abbreviation, and resolves between corpus nodes and citation
//! strings such as `"Gen 1:30-2:3"` or `"Ezek 1:1-3; 2:1"`.
//!
//! # Example
//!
//! ```
//! use tftools::prelude::*;
//!
//! assert_eq!(to_canonical("I Samuel", false).unwrap(), "1 Sam");
//! assert_eq!(to_canonical("Genesis", true).unwrap(), "Gen");
//!
//! let mut b = CorpusBuilder::new();
//! b.book("Genesis");
//! b.simple_chapter(1, 31);
//! b.simple_chapter(2, 25);
//! let resolver = Resolver::new(b.build());
//!
//! let verses = resolver.parse_reference_list("Gen 1:30-2:3").unwrap();
//! assert_eq!(verses.len(), 5);
//! assert_eq!(resolver.reference_string(verses[0], RefStyle::Canonical), "Gen 1:30");
//! ```
//!
//! # Loading datasets
//!
//! ```no_run
//! use tftools::prelude::*;
//!
//! let mut ws = Workspace::new(ToolsConfig::default());
//! ws.load_one(DatasetKey::B, None).unwrap();
//!
//! let options = GetOptions { words: true, join: Some(" ".into()), ..Default::default() };
//! for verse in getver(&ws, "Gen 2:1-4", "B", &options).unwrap() {
//!     println!("{}", tftools::output::format_result(&verse));
//! }
//! ```

pub mod api;
pub mod booknm;
pub mod config;
pub mod corpus;
pub mod datasets;
pub mod db;
pub mod models;
pub mod output;
pub mod refs;
pub mod similarity;
pub mod version;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::api::{base_word_feature, getref, getver, ApiError, GetOptions, VerseResult};
    pub use crate::booknm::{
        alias_table, canonical_names, citation, cite_range, to_canonical, UnknownBookError,
        BHS_TO_CANONICAL, FUZZY_CUTOFF,
    };
    pub use crate::config::{ConfigError, DatasetOverride, ToolsConfig};
    pub use crate::corpus::{Corpus, CorpusAccessor, CorpusBuilder};
    pub use crate::datasets::{
        default_spec, DatasetError, DatasetKey, DatasetSpec, LoadedDataset, Workspace,
    };
    pub use crate::db::{load_corpus, load_feature_module, load_meta, write_corpus, DbError};
    pub use crate::models::{
        Node, NodeRecord, RefSpec, RefStyle, Reference, Section, VersionInfo, WordRow,
    };
    pub use crate::output::{
        format_result, print_results, write_csv, write_csv_file, write_json, write_json_file,
        OutputError,
    };
    pub use crate::refs::{
        parse_node_spec, parse_reference_specs, parse_single_reference, RefError, Resolver,
    };
    pub use crate::similarity::{close_match, ratio};
    pub use crate::version::{format_version, version_info, version_info_from_meta};
}

// Re-export commonly used types at the crate root
pub use booknm::to_canonical;
pub use models::{Node, RefStyle, Reference, Section};
pub use refs::{RefError, Resolver};
