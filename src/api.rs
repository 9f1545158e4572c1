//! Notebook-style lookups: node ids or verse references in, one result per verse out.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::corpus::CorpusAccessor;
use crate::datasets::{DatasetError, DatasetKey, LoadedDataset, Workspace};
use crate::models::{Node, RefStyle, WordRow};
use crate::refs::{RefError, Resolver};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Reference(#[from] RefError),
}

/// What to return per verse
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Return word tokens instead of just the reference
    pub words: bool,
    /// Join tokens with this separator into one string
    pub join: Option<String>,
    /// Extra word features; non-empty switches to a word table
    pub other_features: Vec<String>,
    /// Word table even without extra features
    pub table: bool,
    pub style: RefStyle,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerseResult {
    Ref {
        reference: String,
    },
    Words {
        reference: String,
        tokens: Vec<String>,
    },
    Text {
        reference: String,
        text: String,
    },
    Table {
        reference: String,
        rows: Vec<WordRow>,
    },
}

impl VerseResult {
    pub fn reference(&self) -> &str {
        match self {
            VerseResult::Ref { reference }
            | VerseResult::Words { reference, .. }
            | VerseResult::Text { reference, .. }
            | VerseResult::Table { reference, .. } => reference,
        }
    }
}

/// Feature holding the word surface: consonantal text for BHSA,
/// `g_word_utf8` or `text` elsewhere, then the resolver's default list.
pub fn base_word_feature<C: CorpusAccessor>(key: DatasetKey, resolver: &Resolver<C>) -> String {
    let preferred: &[&str] = match key {
        DatasetKey::B => &["g_cons_utf8", "g_cons"],
        _ => &["g_word_utf8", "text"],
    };
    preferred
        .iter()
        .find(|f| resolver.corpus().has_feature(f))
        .map(|f| f.to_string())
        .or_else(|| resolver.resolve_feature("default"))
        .unwrap_or_else(|| "text".to_string())
}

/// Verses containing `nodes`, first occurrence order, nodes outside verses dropped
pub fn unique_verses<C: CorpusAccessor>(resolver: &Resolver<C>, nodes: &[Node]) -> Vec<Node> {
    let mut seen = HashSet::new();
    nodes
        .iter()
        .filter_map(|&n| resolver.verse_containing(n))
        .filter(|v| seen.insert(*v))
        .collect()
}

fn word_table(dataset: &LoadedDataset, verse: Node, reference: &str, extra: &[String]) -> Vec<WordRow> {
    let corpus = dataset.corpus();
    let base = base_word_feature(dataset.key, &dataset.resolver);

    corpus
        .words_of(verse)
        .into_iter()
        .enumerate()
        .map(|(idx, word)| WordRow {
            node: word,
            reference: reference.to_string(),
            i: idx + 1,
            word: corpus.feature_value(word, &base),
            extra: extra
                .iter()
                .map(|f| (f.clone(), corpus.feature_value(word, f)))
                .collect::<BTreeMap<_, _>>(),
        })
        .collect()
}

/// Build one result per verse node according to `options`.
pub fn verse_results(dataset: &LoadedDataset, verses: &[Node], options: &GetOptions) -> Vec<VerseResult> {
    let resolver = &dataset.resolver;

    verses
        .iter()
        .map(|&verse| {
            let reference = resolver.reference_string(verse, options.style);

            if options.table || !options.other_features.is_empty() {
                let rows = word_table(dataset, verse, &reference, &options.other_features);
                return VerseResult::Table { reference, rows };
            }

            if options.words {
                let feature = base_word_feature(dataset.key, resolver);
                let tokens = resolver.verse_words(verse, &feature);
                return match &options.join {
                    Some(sep) => VerseResult::Text {
                        reference,
                        text: tokens.join(sep),
                    },
                    None => VerseResult::Words { reference, tokens },
                };
            }

            VerseResult::Ref { reference }
        })
        .collect()
}

/// From node ids (any level) to one result per containing verse.
pub fn getref(
    workspace: &Workspace,
    nodes: &[Node],
    ds: &str,
    options: &GetOptions,
) -> Result<Vec<VerseResult>, ApiError> {
    let dataset = workspace.dataset(ds)?;
    let verses = unique_verses(&dataset.resolver, nodes);
    tracing::debug!(ds, nodes = nodes.len(), verses = verses.len(), "getref");
    Ok(verse_results(dataset, &verses, options))
}

/// From verse references (`"Gen 2:1-4; 3:1"`) to one result per verse.
pub fn getver(
    workspace: &Workspace,
    verses: &str,
    ds: &str,
    options: &GetOptions,
) -> Result<Vec<VerseResult>, ApiError> {
    let dataset = workspace.dataset(ds)?;
    let nodes = dataset.resolver.parse_reference_list(verses)?;
    tracing::debug!(ds, spec = verses, verses = nodes.len(), "getver");
    Ok(verse_results(dataset, &nodes, options))
}
