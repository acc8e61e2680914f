use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search_core::persist::{load_index, load_snippet, publish_index, IndexPaths, MetaFile};
use search_core::query::TermMatch;
use search_core::{Document, Index, SearchHit};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct InputDoc {
    title: String,
    body: String,
    url: Option<String>,
}

impl From<InputDoc> for Document {
    fn from(doc: InputDoc) -> Self {
        let body = format!("{}\n\n{}", doc.title, doc.body);
        Document { title: doc.title, url: doc.url.filter(|u| !u.trim().is_empty()), body }
    }
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a TF-IDF index of problem statements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from input JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
    },
    /// Rank indexed documents against a free-text query
    Query {
        /// Index directory path
        #[arg(long, default_value = "./index")]
        index: String,
        /// Maximum number of results (clamped to 1..=100)
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Include the per-term weight breakdown
        #[arg(long, default_value_t = false)]
        explain: bool,
        /// Attach the start of each document's stored text
        #[arg(long, default_value_t = false)]
        snippets: bool,
        /// Query words
        #[arg(required = true)]
        query: Vec<String>,
    },
}

#[derive(Serialize)]
struct QueryHit {
    #[serde(flatten)]
    hit: SearchHit,
    #[serde(skip_serializing_if = "Option::is_none")]
    snippet: Option<String>,
}

#[derive(Serialize)]
struct Explained {
    matches: Vec<TermMatch>,
    results: Vec<QueryHit>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_index(&input, &output),
        Commands::Query { index, limit, explain, snippets, query } => {
            run_query(&index, &query.join(" "), limit, explain, snippets)
        }
    }
}

fn build_index(input: &str, output: &str) -> Result<()> {
    let docs = load_corpus(Path::new(input))?;
    tracing::info!(num_docs = docs.len(), input, "ingested documents");

    let index = Index::build(&docs)?;
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    let meta = MetaFile::for_index(&index, created_at);
    let texts: Vec<&str> = docs.iter().map(|d| d.body.as_str()).collect();
    publish_index(&IndexPaths::new(output), &index, &texts, &meta)
        .with_context(|| format!("publishing index to {output}"))?;

    tracing::info!(output, num_terms = meta.num_terms, num_cells = meta.num_cells, "index build complete");
    Ok(())
}

fn run_query(index_dir: &str, query: &str, limit: usize, explain: bool, snippets: bool) -> Result<()> {
    let paths = IndexPaths::new(index_dir);
    let index = load_index(&paths).with_context(|| format!("loading index from {index_dir}"))?;

    let matches = if explain { index.explain(query) } else { Vec::new() };
    let results = index
        .search(query, Some(limit))
        .into_iter()
        .map(|hit| {
            let snippet = if snippets {
                load_snippet(&paths, hit.doc_id, SNIPPET_CHARS)
                    .with_context(|| format!("reading text of document {}", hit.doc_id))?
            } else {
                None
            };
            Ok(QueryHit { hit, snippet })
        })
        .collect::<Result<Vec<QueryHit>>>()?;
    tracing::info!(query, hits = results.len(), "query complete");

    let json = if explain {
        serde_json::to_string_pretty(&Explained { matches, results })?
    } else {
        serde_json::to_string_pretty(&results)?
    };
    println!("{json}");
    Ok(())
}

/// Collect documents from a file, or every .json/.jsonl file under a directory
/// in file-name order, so ordinals are stable across builds.
fn load_corpus(input_path: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter() {
            let entry = entry?;
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        anyhow::bail!("input path {} does not exist", input_path.display());
    }

    let mut docs = Vec::new();
    for file in files {
        let before = docs.len();
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
        tracing::debug!(file = %file.display(), docs = docs.len() - before, "read corpus file");
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), i + 1))?;
        docs.push(doc.into());
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: InputDoc = serde_json::from_value(v)?;
                docs.push(doc.into());
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDoc = serde_json::from_value(json)?;
            docs.push(doc.into());
        }
        _ => tracing::warn!(file = %file.display(), "skipping JSON that is neither an object nor an array"),
    }
    Ok(())
}
