//! Output formatting for lookup results (text, JSON, CSV).

use crate::api::VerseResult;
use crate::models::WordRow;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write results as a JSON array.
pub fn write_json<W: Write>(results: &[VerseResult], writer: &mut W) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(results)?;
    writer.write_all(json.as_bytes())?;
    writeln!(writer)?;
    Ok(())
}

/// Write results as JSON to a file.
pub fn write_json_file(results: &[VerseResult], path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_json(results, &mut file)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write word rows as CSV: `node,ref,i,word` then one column per extra feature.
pub fn write_csv<W: Write>(rows: &[WordRow], writer: &mut W) -> Result<(), OutputError> {
    let extra: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.extra.keys().map(String::as_str))
        .collect();

    let mut header = vec!["node", "ref", "i", "word"];
    header.extend(extra.iter().copied());
    writeln!(writer, "{}", header.join(","))?;

    for row in rows {
        let mut fields = vec![
            row.node.to_string(),
            csv_field(&row.reference),
            row.i.to_string(),
            csv_field(row.word.as_deref().unwrap_or("")),
        ];
        for name in &extra {
            let value = row.extra.get(*name).and_then(|v| v.as_deref()).unwrap_or("");
            fields.push(csv_field(value));
        }
        writeln!(writer, "{}", fields.join(","))?;
    }
    Ok(())
}

/// Write word rows as CSV to a file.
pub fn write_csv_file(rows: &[WordRow], path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_csv(rows, &mut file)
}

/// Word rows of every table result, in order
pub fn table_rows(results: &[VerseResult]) -> Vec<WordRow> {
    results
        .iter()
        .flat_map(|r| match r {
            VerseResult::Table { rows, .. } => rows.clone(),
            _ => Vec::new(),
        })
        .collect()
}

/// Format a single result for terminal display.
pub fn format_result(result: &VerseResult) -> String {
    match result {
        VerseResult::Ref { reference } => reference.clone(),
        VerseResult::Words { reference, tokens } => format!("{}: {:?}", reference, tokens),
        VerseResult::Text { reference, text } => format!("{}: {}", reference, text),
        VerseResult::Table { reference, rows } => {
            let mut out = reference.clone();
            for row in rows {
                out.push_str(&format!(
                    "\n  {:>3} {:>8} {}",
                    row.i,
                    row.node,
                    row.word.as_deref().unwrap_or("-")
                ));
                for (name, value) in &row.extra {
                    out.push_str(&format!("  {}={}", name, value.as_deref().unwrap_or("-")));
                }
            }
            out
        }
    }
}

pub fn print_results(results: &[VerseResult]) {
    for result in results {
        println!("{}", format_result(result));
    }
}
