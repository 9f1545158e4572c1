//! SQLite storage for corpora (`corpus.db`).
//!
//! Schema:
//! - `nodes(node, otype, book, chapter, verse)`: one row per node
//! - `features(node, name, value)`: textual feature values
//! - `meta(key, value)`: provenance (dataset, repo, released, app)

use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::corpus::Corpus;
use crate::models::{Node, NodeRecord, Section};

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corpus file not found: {0}")]
    MissingCorpus(PathBuf),
    #[error("Invalid node record {node}: {reason}")]
    InvalidRecord { node: Node, reason: String },
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS nodes (
    node    INTEGER PRIMARY KEY,
    otype   TEXT NOT NULL,
    book    TEXT,
    chapter INTEGER,
    verse   INTEGER
);
CREATE TABLE IF NOT EXISTS features (
    node  INTEGER NOT NULL,
    name  TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (node, name)
);
CREATE TABLE IF NOT EXISTS meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

fn open_existing(db_path: &Path) -> Result<Connection, DbError> {
    if !db_path.exists() {
        return Err(DbError::MissingCorpus(db_path.to_path_buf()));
    }
    Ok(Connection::open(db_path)?)
}

/// Create the corpus tables if they do not exist yet.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Write a corpus (records, features and meta) into a new or existing file.
pub fn write_corpus(corpus: &Corpus, db_path: &Path) -> Result<(), DbError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut conn = Connection::open(db_path)?;
    create_schema(&conn)?;

    let tx = conn.transaction()?;
    {
        let mut node_stmt = tx.prepare(
            "INSERT OR REPLACE INTO nodes (node, otype, book, chapter, verse)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for record in corpus.records() {
            node_stmt.execute(params![
                record.node,
                record.otype,
                record.section.book,
                record.section.chapter,
                record.section.verse,
            ])?;
        }

        let mut feature_stmt = tx.prepare(
            "INSERT OR REPLACE INTO features (node, name, value) VALUES (?1, ?2, ?3)",
        )?;
        for (name, node, value) in corpus.feature_triples() {
            feature_stmt.execute(params![node, name, value])?;
        }

        let mut meta_stmt =
            tx.prepare("INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)")?;
        for (key, value) in corpus.meta_entries() {
            meta_stmt.execute(params![key, value])?;
        }
    }
    tx.commit()?;

    tracing::info!(path = %db_path.display(), nodes = corpus.node_count(), "wrote corpus");
    Ok(())
}

fn load_records(conn: &Connection, progress: Option<&ProgressBar>) -> Result<Vec<NodeRecord>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT node, otype, book, chapter, verse FROM nodes ORDER BY node",
    )?;
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();

    while let Some(row) = rows.next()? {
        let node: Node = row.get(0)?;
        let otype: String = row.get(1)?;
        let book: Option<String> = row.get(2)?;
        let chapter: Option<u32> = row.get(3)?;
        let verse: Option<u32> = row.get(4)?;

        if book.is_none() && chapter.is_some() {
            return Err(DbError::InvalidRecord {
                node,
                reason: "chapter without book".to_string(),
            });
        }

        records.push(NodeRecord {
            node,
            otype,
            section: Section::from_parts(book, chapter, verse),
        });
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    Ok(records)
}

fn load_feature_rows(conn: &Connection) -> Result<Vec<(String, Node, String)>, DbError> {
    let mut stmt = conn.prepare("SELECT name, node, value FROM features")?;
    let mut rows = stmt.query([])?;
    let mut features = Vec::new();

    while let Some(row) = rows.next()? {
        features.push((row.get(0)?, row.get(1)?, row.get(2)?));
    }

    Ok(features)
}

/// Load the `meta` table.
pub fn load_meta(db_path: &Path) -> Result<HashMap<String, String>, DbError> {
    let conn = open_existing(db_path)?;
    read_meta(&conn)
}

fn read_meta(conn: &Connection) -> Result<HashMap<String, String>, DbError> {
    let mut stmt = conn.prepare("SELECT key, value FROM meta")?;
    let mut rows = stmt.query([])?;
    let mut meta = HashMap::new();

    while let Some(row) = rows.next()? {
        meta.insert(row.get(0)?, row.get(1)?);
    }

    Ok(meta)
}

/// Load a full corpus into memory.
pub fn load_corpus(db_path: &Path, show_progress: bool) -> Result<Corpus, DbError> {
    let conn = open_existing(db_path)?;

    let progress = if show_progress {
        let total: u64 = conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} nodes")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let records = load_records(&conn, progress.as_ref())?;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let features = load_feature_rows(&conn)?;
    let mut corpus = Corpus::from_records(records, features);
    for (key, value) in read_meta(&conn)? {
        corpus.set_meta(key, value);
    }

    tracing::info!(
        path = %db_path.display(),
        nodes = corpus.node_count(),
        features = corpus.feature_names().len(),
        "loaded corpus"
    );
    Ok(corpus)
}

/// Merge the `features` table of a module file into a loaded corpus.
pub fn load_feature_module(corpus: &mut Corpus, module_path: &Path) -> Result<usize, DbError> {
    let conn = open_existing(module_path)?;
    let features = load_feature_rows(&conn)?;
    let count = features.len();
    corpus.merge_features(features);
    tracing::info!(path = %module_path.display(), values = count, "merged feature module");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusAccessor, CorpusBuilder};

    fn sample() -> Corpus {
        let mut b = CorpusBuilder::new();
        b.book("Jesaia");
        b.chapter(1);
        b.verse(1);
        b.word(&[("g_cons_utf8", "חזון"), ("lex", "XZWN/")]);
        b.word(&[("g_cons_utf8", "ישעיהו"), ("lex", "JC<JHW/")]);
        let mut corpus = b.build();
        corpus.set_meta("dataset", "BHSA");
        corpus
    }

    #[test]
    fn test_write_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.db");
        write_corpus(&sample(), &path).unwrap();

        let loaded = load_corpus(&path, false).unwrap();
        assert_eq!(loaded.node_count(), 5);
        let verse = loaded.node_of_section("Jesaia", Some(1), Some(1)).unwrap();
        let words = loaded.words_of(verse);
        assert_eq!(words.len(), 2);
        assert_eq!(
            loaded.feature_value(words[1], "lex").as_deref(),
            Some("JC<JHW/")
        );
        assert_eq!(loaded.meta("dataset"), Some("BHSA"));
    }

    #[test]
    fn test_load_meta_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("corpus.db");
        write_corpus(&sample(), &path).unwrap();

        let meta = load_meta(&path).unwrap();
        assert_eq!(meta.len(), 1);
        assert_eq!(meta["dataset"], "BHSA");
        assert!(matches!(
            load_meta(&dir.path().join("absent.db")),
            Err(DbError::MissingCorpus(_))
        ));
    }

    #[test]
    fn test_missing_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_corpus(&dir.path().join("absent.db"), false).unwrap_err();
        assert!(matches!(err, DbError::MissingCorpus(_)));
    }

    #[test]
    fn test_feature_module_merge() {
        let dir = tempfile::tempdir().unwrap();
        let core_path = dir.path().join("corpus.db");
        let module_path = dir.path().join("module.db");
        let corpus = sample();
        write_corpus(&corpus, &core_path).unwrap();

        let conn = Connection::open(&module_path).unwrap();
        create_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO features (node, name, value) VALUES (4, 'gloss', 'vision')",
            [],
        )
        .unwrap();
        drop(conn);

        let mut loaded = load_corpus(&core_path, false).unwrap();
        let merged = load_feature_module(&mut loaded, &module_path).unwrap();
        assert_eq!(merged, 1);
        assert_eq!(loaded.feature_value(4, "gloss").as_deref(), Some("vision"));
    }

    #[test]
    fn test_chapter_without_book_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.db");
        let conn = Connection::open(&path).unwrap();
        create_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO nodes (node, otype, book, chapter, verse) VALUES (1, 'chapter', NULL, 1, NULL)",
            [],
        )
        .unwrap();
        drop(conn);

        let err = load_corpus(&path, false).unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { node: 1, .. }));
    }
}
