//! Corpus accessor capability and an in-memory corpus implementing it.
//!
//! The resolver never looks inside a node id; everything it needs goes
//! through [`CorpusAccessor`]. [`Corpus`] is the concrete implementation
//! used by the loader and the tests: node records indexed by section, plus
//! a feature table keyed by feature name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Node, NodeRecord, Section};

pub const OTYPE_BOOK: &str = "book";
pub const OTYPE_CHAPTER: &str = "chapter";
pub const OTYPE_VERSE: &str = "verse";
pub const OTYPE_WORD: &str = "word";

/// Read-only view of a loaded corpus
pub trait CorpusAccessor {
    /// Section containing `node`
    fn section_of(&self, node: Node) -> Section;

    /// Node for a book (`chapter = None`), chapter (`verse = None`) or verse
    fn node_of_section(&self, book: &str, chapter: Option<u32>, verse: Option<u32>) -> Option<Node>;

    /// Verse nodes of a chapter, in document order
    fn verses_of_chapter(&self, book: &str, chapter: u32) -> Vec<Node>;

    /// One node per book, in document order
    fn book_nodes(&self) -> Vec<Node>;

    /// Word nodes of a verse, in document order
    fn words_of(&self, verse: Node) -> Vec<Node>;

    /// Whether the corpus carries the named feature at all
    fn has_feature(&self, feature: &str) -> bool;

    /// Value of a feature at a node; `None` if the feature or the value is absent
    fn feature_value(&self, node: Node, feature: &str) -> Option<String>;
}

impl<C: CorpusAccessor + ?Sized> CorpusAccessor for &C {
    fn section_of(&self, node: Node) -> Section {
        (**self).section_of(node)
    }
    fn node_of_section(&self, book: &str, chapter: Option<u32>, verse: Option<u32>) -> Option<Node> {
        (**self).node_of_section(book, chapter, verse)
    }
    fn verses_of_chapter(&self, book: &str, chapter: u32) -> Vec<Node> {
        (**self).verses_of_chapter(book, chapter)
    }
    fn book_nodes(&self) -> Vec<Node> {
        (**self).book_nodes()
    }
    fn words_of(&self, verse: Node) -> Vec<Node> {
        (**self).words_of(verse)
    }
    fn has_feature(&self, feature: &str) -> bool {
        (**self).has_feature(feature)
    }
    fn feature_value(&self, node: Node, feature: &str) -> Option<String> {
        (**self).feature_value(node, feature)
    }
}

impl<C: CorpusAccessor + ?Sized> CorpusAccessor for Arc<C> {
    fn section_of(&self, node: Node) -> Section {
        (**self).section_of(node)
    }
    fn node_of_section(&self, book: &str, chapter: Option<u32>, verse: Option<u32>) -> Option<Node> {
        (**self).node_of_section(book, chapter, verse)
    }
    fn verses_of_chapter(&self, book: &str, chapter: u32) -> Vec<Node> {
        (**self).verses_of_chapter(book, chapter)
    }
    fn book_nodes(&self) -> Vec<Node> {
        (**self).book_nodes()
    }
    fn words_of(&self, verse: Node) -> Vec<Node> {
        (**self).words_of(verse)
    }
    fn has_feature(&self, feature: &str) -> bool {
        (**self).has_feature(feature)
    }
    fn feature_value(&self, node: Node, feature: &str) -> Option<String> {
        (**self).feature_value(node, feature)
    }
}

/// In-memory corpus. Document order is ascending node id.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<NodeRecord>,
    by_node: HashMap<Node, usize>,
    books: Vec<Node>,
    book_index: HashMap<String, Node>,
    chapter_index: HashMap<(String, u32), Node>,
    verse_index: HashMap<(String, u32, u32), Node>,
    chapter_verses: HashMap<(String, u32), Vec<Node>>,
    verse_words: HashMap<Node, Vec<Node>>,
    features: HashMap<String, HashMap<Node, String>>,
    meta: HashMap<String, String>,
}

impl Corpus {
    /// Index a set of node records and feature values.
    ///
    /// Words are attached to the verse whose section they share.
    pub fn from_records(
        mut records: Vec<NodeRecord>,
        features: impl IntoIterator<Item = (String, Node, String)>,
    ) -> Self {
        records.sort_by_key(|r| r.node);

        let mut corpus = Corpus::default();
        let mut pending_words: Vec<(Node, (String, u32, u32))> = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            corpus.by_node.insert(record.node, idx);
            let section = &record.section;

            match record.otype.as_str() {
                OTYPE_BOOK => {
                    if let Some(book) = &section.book {
                        corpus.books.push(record.node);
                        corpus.book_index.entry(book.clone()).or_insert(record.node);
                    }
                }
                OTYPE_CHAPTER => {
                    if let (Some(book), Some(chapter)) = (&section.book, section.chapter) {
                        corpus
                            .chapter_index
                            .entry((book.clone(), chapter))
                            .or_insert(record.node);
                    }
                }
                OTYPE_VERSE => {
                    if let Some((book, chapter, verse)) = section.as_verse() {
                        corpus
                            .verse_index
                            .entry((book.to_string(), chapter, verse))
                            .or_insert(record.node);
                        corpus
                            .chapter_verses
                            .entry((book.to_string(), chapter))
                            .or_default()
                            .push(record.node);
                    }
                }
                OTYPE_WORD => {
                    if let Some((book, chapter, verse)) = section.as_verse() {
                        pending_words.push((record.node, (book.to_string(), chapter, verse)));
                    }
                }
                _ => {}
            }
        }

        for (word, key) in pending_words {
            if let Some(&verse) = corpus.verse_index.get(&key) {
                corpus.verse_words.entry(verse).or_default().push(word);
            }
        }

        corpus.records = records;
        corpus.merge_features(features);
        corpus
    }

    /// Layer feature values over the corpus; later values overwrite earlier ones.
    pub fn merge_features(&mut self, features: impl IntoIterator<Item = (String, Node, String)>) {
        for (name, node, value) in features {
            self.features.entry(name).or_default().insert(node, value);
        }
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.insert(key.into(), value.into());
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    pub fn meta_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.meta.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    /// All `(feature, node, value)` triples, sorted for stable output
    pub fn feature_triples(&self) -> Vec<(&str, Node, &str)> {
        let mut out: Vec<(&str, Node, &str)> = self
            .features
            .iter()
            .flat_map(|(name, values)| {
                values
                    .iter()
                    .map(move |(node, value)| (name.as_str(), *node, value.as_str()))
            })
            .collect();
        out.sort();
        out
    }

    pub fn feature_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.features.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn otype(&self, node: Node) -> Option<&str> {
        self.by_node
            .get(&node)
            .map(|&idx| self.records[idx].otype.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.records.len()
    }
}

impl CorpusAccessor for Corpus {
    fn section_of(&self, node: Node) -> Section {
        self.by_node
            .get(&node)
            .map(|&idx| self.records[idx].section.clone())
            .unwrap_or_default()
    }

    fn node_of_section(&self, book: &str, chapter: Option<u32>, verse: Option<u32>) -> Option<Node> {
        match (chapter, verse) {
            (None, _) => self.book_index.get(book).copied(),
            (Some(c), None) => self.chapter_index.get(&(book.to_string(), c)).copied(),
            (Some(c), Some(v)) => self.verse_index.get(&(book.to_string(), c, v)).copied(),
        }
    }

    fn verses_of_chapter(&self, book: &str, chapter: u32) -> Vec<Node> {
        self.chapter_verses
            .get(&(book.to_string(), chapter))
            .cloned()
            .unwrap_or_default()
    }

    fn book_nodes(&self) -> Vec<Node> {
        self.books.clone()
    }

    fn words_of(&self, verse: Node) -> Vec<Node> {
        self.verse_words.get(&verse).cloned().unwrap_or_default()
    }

    fn has_feature(&self, feature: &str) -> bool {
        self.features.contains_key(feature)
    }

    fn feature_value(&self, node: Node, feature: &str) -> Option<String> {
        self.features.get(feature)?.get(&node).cloned()
    }
}

/// Builds a corpus book by book, assigning node ids in document order.
///
/// ```
/// use tftools::corpus::{CorpusAccessor, CorpusBuilder};
///
/// let mut b = CorpusBuilder::new();
/// b.book("Genesis");
/// b.chapter(1);
/// b.verse(1);
/// b.word(&[("text", "In")]);
/// let corpus = b.build();
/// assert_eq!(corpus.verses_of_chapter("Genesis", 1).len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    next: Node,
    records: Vec<NodeRecord>,
    features: Vec<(String, Node, String)>,
    book: Option<String>,
    chapter: Option<u32>,
    verse: Option<u32>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self {
            next: 1,
            ..Default::default()
        }
    }

    fn push(&mut self, otype: &str, section: Section) -> Node {
        let node = self.next;
        self.next += 1;
        self.records.push(NodeRecord {
            node,
            otype: otype.to_string(),
            section,
        });
        node
    }

    pub fn book(&mut self, label: &str) -> Node {
        self.book = Some(label.to_string());
        self.chapter = None;
        self.verse = None;
        self.push(OTYPE_BOOK, Section::book(label))
    }

    /// Start a chapter in the current book. Panics without an open book.
    pub fn chapter(&mut self, chapter: u32) -> Node {
        let book = self.book.clone().expect("chapter() called before book()");
        self.chapter = Some(chapter);
        self.verse = None;
        self.push(OTYPE_CHAPTER, Section::chapter(book, chapter))
    }

    /// Start a verse in the current chapter. Panics without an open chapter.
    pub fn verse(&mut self, verse: u32) -> Node {
        let book = self.book.clone().expect("verse() called before book()");
        let chapter = self.chapter.expect("verse() called before chapter()");
        self.verse = Some(verse);
        self.push(OTYPE_VERSE, Section::verse(book, chapter, verse))
    }

    /// Add a word with its feature values to the current verse.
    pub fn word(&mut self, features: &[(&str, &str)]) -> Node {
        let section = Section::from_parts(self.book.clone(), self.chapter, self.verse);
        let node = self.push(OTYPE_WORD, section);
        for (name, value) in features {
            self.features
                .push((name.to_string(), node, value.to_string()));
        }
        node
    }

    /// Add a whole chapter of `verses` verses, each holding one word whose
    /// `text` feature is its own reference.
    pub fn simple_chapter(&mut self, chapter: u32, verses: u32) {
        let book = self.book.clone().unwrap_or_default();
        self.chapter(chapter);
        for v in 1..=verses {
            self.verse(v);
            let text = format!("{book} {chapter}:{v}");
            self.word(&[("text", text.as_str())]);
        }
    }

    pub fn build(self) -> Corpus {
        Corpus::from_records(self.records, self.features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Corpus {
        let mut b = CorpusBuilder::new();
        b.book("Genesis");
        b.simple_chapter(1, 3);
        b.simple_chapter(2, 2);
        b.book("Exodus");
        b.simple_chapter(1, 2);
        b.build()
    }

    #[test]
    fn test_section_lookup_round_trip() {
        let corpus = sample();
        let verse = corpus.node_of_section("Genesis", Some(2), Some(1)).unwrap();
        assert_eq!(corpus.section_of(verse), Section::verse("Genesis", 2, 1));
        assert_eq!(corpus.otype(verse), Some(OTYPE_VERSE));
    }

    #[test]
    fn test_verses_in_document_order() {
        let corpus = sample();
        let verses = corpus.verses_of_chapter("Genesis", 1);
        assert_eq!(verses.len(), 3);
        assert!(verses.windows(2).all(|w| w[0] < w[1]));
        assert!(corpus.verses_of_chapter("Genesis", 9).is_empty());
    }

    #[test]
    fn test_book_nodes() {
        let corpus = sample();
        let books: Vec<_> = corpus
            .book_nodes()
            .into_iter()
            .map(|n| corpus.section_of(n).book.unwrap())
            .collect();
        assert_eq!(books, vec!["Genesis", "Exodus"]);
    }

    #[test]
    fn test_words_and_features() {
        let corpus = sample();
        let verse = corpus.node_of_section("Exodus", Some(1), Some(2)).unwrap();
        let words = corpus.words_of(verse);
        assert_eq!(words.len(), 1);
        assert_eq!(
            corpus.feature_value(words[0], "text").as_deref(),
            Some("Exodus 1:2")
        );
        assert!(corpus.has_feature("text"));
        assert!(!corpus.has_feature("g_cons_utf8"));
        assert_eq!(corpus.feature_value(words[0], "g_cons_utf8"), None);
    }

    #[test]
    fn test_unknown_node_has_empty_section() {
        let corpus = sample();
        assert_eq!(corpus.section_of(9999), Section::none());
    }

    #[test]
    fn test_merge_features_overrides() {
        let mut corpus = sample();
        let verse = corpus.node_of_section("Genesis", Some(1), Some(1)).unwrap();
        let word = corpus.words_of(verse)[0];
        corpus.merge_features(vec![("gloss".to_string(), word, "beginning".to_string())]);
        assert_eq!(corpus.feature_value(word, "gloss").as_deref(), Some("beginning"));
    }
}
