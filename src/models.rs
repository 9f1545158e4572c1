//! Data structures shared by the normalizer, the resolver and the corpus layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Opaque node handle handed out by a corpus
pub type Node = u32;

/// A (book, chapter, verse) location.
///
/// Absence is hierarchical: there is never a verse without a chapter,
/// nor a chapter without a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    pub book: Option<String>,
    pub chapter: Option<u32>,
    pub verse: Option<u32>,
}

impl Section {
    /// Section outside any book (e.g. a node above book level)
    pub fn none() -> Self {
        Self::default()
    }

    pub fn book(book: impl Into<String>) -> Self {
        Self {
            book: Some(book.into()),
            chapter: None,
            verse: None,
        }
    }

    pub fn chapter(book: impl Into<String>, chapter: u32) -> Self {
        Self {
            book: Some(book.into()),
            chapter: Some(chapter),
            verse: None,
        }
    }

    pub fn verse(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: Some(book.into()),
            chapter: Some(chapter),
            verse: Some(verse),
        }
    }

    /// Build a section from raw columns, dropping anything below the first gap.
    pub fn from_parts(book: Option<String>, chapter: Option<u32>, verse: Option<u32>) -> Self {
        match (book, chapter, verse) {
            (None, _, _) => Self::none(),
            (Some(b), None, _) => Self::book(b),
            (Some(b), Some(c), None) => Self::chapter(b, c),
            (Some(b), Some(c), Some(v)) => Self::verse(b, c, v),
        }
    }

    /// The full (book, chapter, verse) triple, if this is a verse-level section
    pub fn as_verse(&self) -> Option<(&str, u32, u32)> {
        match (&self.book, self.chapter, self.verse) {
            (Some(b), Some(c), Some(v)) => Some((b.as_str(), c, v)),
            _ => None,
        }
    }
}

/// A structured reference: book always present, chapter and verse optional.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Canonical abbreviation when the normalizer knows the book,
    /// otherwise the token exactly as written.
    pub book: String,
    pub chapter: Option<u32>,
    pub verse: Option<u32>,
}

impl Reference {
    pub fn new(book: impl Into<String>, chapter: Option<u32>, verse: Option<u32>) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse: chapter.and(verse),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.chapter, self.verse) {
            (None, _) => write!(f, "{}", self.book),
            (Some(c), None) => write!(f, "{} {}", self.book, c),
            (Some(c), Some(v)) => write!(f, "{} {}:{}", self.book, c, v),
        }
    }
}

/// A parsed reference segment: one location or an inclusive range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefSpec {
    Single(Reference),
    Range { start: Reference, end: Reference },
}

impl RefSpec {
    /// First book token of the segment
    pub fn book(&self) -> &str {
        match self {
            RefSpec::Single(r) => &r.book,
            RefSpec::Range { start, .. } => &start.book,
        }
    }
}

/// Which book label a reference string uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RefStyle {
    /// The corpus's own label (e.g. `Jesaia 1:1` in BHSA)
    Native,
    /// Canonical abbreviation (e.g. `Isa 1:1`)
    #[default]
    Canonical,
}

impl FromStr for RefStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "dataset" => Ok(RefStyle::Native),
            "canonical" | "sbl" => Ok(RefStyle::Canonical),
            other => Err(format!("unknown reference style: {other:?}")),
        }
    }
}

/// One stored node: its object type and its section columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node: Node,
    pub otype: String,
    pub section: Section,
}

/// One word of a verse word table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordRow {
    pub node: Node,
    #[serde(rename = "ref")]
    pub reference: String,
    /// 1-based position within the verse
    pub i: usize,
    pub word: Option<String>,
    /// Additional requested feature columns, `None` when the feature is absent
    pub extra: BTreeMap<String, Option<String>>,
}

/// Version and provenance of a loaded corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub tool_version: String,
    pub dataset: Option<String>,
    pub repo_url: Option<String>,
    pub released: Option<String>,
    pub app_name: Option<String>,
}
