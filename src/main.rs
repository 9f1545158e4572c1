//! tftools command line
//!
//! Book name normalization, citation formatting and verse lookups over
//! locally stored corpora.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tftools::api::{getref, getver, GetOptions, VerseResult};
use tftools::booknm::{citation, cite_range, to_canonical};
use tftools::config::ToolsConfig;
use tftools::corpus::CorpusAccessor;
use tftools::datasets::{DatasetError, DatasetKey, Workspace};
use tftools::db::load_meta;
use tftools::models::RefStyle;
use tftools::output::{
    print_results, table_rows, write_csv, write_csv_file, write_json, write_json_file,
};
use tftools::refs::parse_node_spec;
use tftools::version::{print_version, tool_version_info, version_info_from_meta};

#[derive(Parser)]
#[command(name = "tftools")]
#[command(about = "Biblical book names and verse references over Text-Fabric corpora")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Corpus data directory [default: $TFTOOLS_DATA_DIR or ./text-fabric-data]
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Suppress progress output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for lookup results
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// One line per verse
    Text,
    /// JSON array of tagged results
    Json,
    /// Word table as CSV
    Csv,
}

/// Citation style (CLI version, mirrors models::RefStyle)
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliRefStyle {
    /// Book labels as the corpus stores them
    Native,
    /// Canonical abbreviations (default)
    Canonical,
}

impl From<CliRefStyle> for RefStyle {
    fn from(style: CliRefStyle) -> Self {
        match style {
            CliRefStyle::Native => RefStyle::Native,
            CliRefStyle::Canonical => RefStyle::Canonical,
        }
    }
}

/// Options shared by getref and getver
#[derive(clap::Args)]
struct LookupArgs {
    /// Dataset key, alias or short name (B, L, D, M, N, bhsa, gnt, ...)
    #[arg(long, short = 'd', default_value = "B")]
    dataset: String,

    /// Return word tokens
    #[arg(long)]
    words: bool,

    /// Extra word features; switches to a word table
    #[arg(long, value_delimiter = ',')]
    features: Vec<String>,

    /// Join word tokens with this separator
    #[arg(long)]
    join: Option<String>,

    #[arg(long, value_enum, default_value = "canonical")]
    style: CliRefStyle,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl LookupArgs {
    fn options(&self) -> GetOptions {
        GetOptions {
            words: self.words || self.join.is_some(),
            join: self.join.clone(),
            other_features: self.features.clone(),
            table: matches!(self.format, OutputFormat::Csv),
            style: self.style.into(),
        }
    }

    fn key(&self) -> Result<DatasetKey, DatasetError> {
        DatasetKey::lookup(&self.dataset)
            .ok_or_else(|| DatasetError::UnknownDataset(self.dataset.clone()))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize book names to canonical abbreviations
    Book {
        names: Vec<String>,

        /// Exact matches only, no fuzzy fallback
        #[arg(long)]
        strict: bool,
    },

    /// Format a citation such as "Gen 1:1" or "Ezek 1:1–3"
    Cite {
        book: String,
        chapter: u32,
        verse: Option<u32>,

        /// Closing verse of a range in the same chapter
        #[arg(long)]
        to: Option<u32>,
    },

    /// Verses containing the given nodes, e.g. "65-70, 91"
    Getref {
        nodes: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Verses for a reference list, e.g. "Gen 2:1-4; 3:1"
    Getver {
        verses: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Books of a dataset with their canonical names
    Info {
        #[arg(long, short = 'd', default_value = "B")]
        dataset: String,
    },

    /// Tool version, plus corpus provenance when a dataset is given
    Version {
        #[arg(long, short = 'd')]
        dataset: Option<String>,
    },
}

fn build_config(cli: &Cli) -> Result<ToolsConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ToolsConfig::load(path)?,
        None => ToolsConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if cli.quiet {
        config.verbose = false;
    }
    Ok(config)
}

fn emit(results: &[VerseResult], lookup: &LookupArgs) -> Result<(), Box<dyn std::error::Error>> {
    match (lookup.format, &lookup.output) {
        (OutputFormat::Text, None) => print_results(results),
        (OutputFormat::Text, Some(path)) => {
            let text: Vec<String> = results.iter().map(tftools::output::format_result).collect();
            std::fs::write(path, text.join("\n") + "\n")?;
        }
        (OutputFormat::Json, None) => write_json(results, &mut std::io::stdout().lock())?,
        (OutputFormat::Json, Some(path)) => write_json_file(results, path)?,
        (OutputFormat::Csv, output) => {
            let rows = table_rows(results);
            match output {
                Some(path) => write_csv_file(&rows, path)?,
                None => write_csv(&rows, &mut std::io::stdout().lock())?,
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match cli.command {
        Commands::Book { names, strict } => {
            for name in &names {
                match to_canonical(name, strict) {
                    Ok(canonical) => println!("{}\t{}", name, canonical),
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                }
            }
        }

        Commands::Cite {
            book,
            chapter,
            verse,
            to,
        } => {
            let text = match (verse, to) {
                (Some(v1), Some(v2)) => cite_range(&book, chapter, v1, v2)?,
                _ => citation(&book, chapter, verse)?,
            };
            println!("{}", text);
        }

        Commands::Getref { nodes, lookup } => {
            let nodes = parse_node_spec(&nodes)?;
            let mut ws = Workspace::new(config);
            ws.load_one(lookup.key()?, None)?;
            let results = getref(&ws, &nodes, &lookup.dataset, &lookup.options())?;
            emit(&results, &lookup)?;
        }

        Commands::Getver { verses, lookup } => {
            let mut ws = Workspace::new(config);
            ws.load_one(lookup.key()?, None)?;
            let results = getver(&ws, &verses, &lookup.dataset, &lookup.options())?;
            if results.is_empty() && !cli.quiet {
                eprintln!("No verses found for {:?}", verses);
            }
            emit(&results, &lookup)?;
        }

        Commands::Info { dataset } => {
            let key = DatasetKey::lookup(&dataset)
                .ok_or_else(|| DatasetError::UnknownDataset(dataset.clone()))?;
            let mut ws = Workspace::new(config);
            let loaded = ws.load_one(key, None)?;
            let corpus = loaded.corpus();

            println!("=== Dataset {} ({}) ===", key, loaded.spec.spec);
            println!("Nodes: {}", corpus.node_count());
            println!("Features: {}", corpus.feature_names().join(", "));
            println!("\n=== Books ===");
            for node in corpus.book_nodes() {
                let Some(native) = corpus.section_of(node).book else {
                    continue;
                };
                let canonical = to_canonical(&native, false).unwrap_or("?");
                println!("  {:<20} {}", native, canonical);
            }
        }

        Commands::Version { dataset } => match dataset {
            Some(name) => {
                let key = DatasetKey::lookup(&name)
                    .ok_or_else(|| DatasetError::UnknownDataset(name.clone()))?;
                // provenance lives in the meta table; skip loading nodes
                let ws = Workspace::new(config);
                let path = ws.spec_for(key).corpus_path(&ws.config().data_dir);
                print_version(&version_info_from_meta(&load_meta(&path)?));
            }
            None => print_version(&tool_version_info()),
        },
    }

    Ok(())
}
