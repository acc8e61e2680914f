use crate::error::{IndexError, Result};
use crate::idf::IdfVector;
use crate::magnitude::Magnitudes;
use crate::tfidf::TfidfMatrix;
use crate::vocab::Vocabulary;
use crate::{DocId, DocMeta, Index, TermId};
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const FORMAT_VERSION: u32 = 1;

/// Build manifest written next to the flat artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: usize,
    pub num_terms: usize,
    pub num_cells: usize,
    pub created_at: String,
    /// Fresh for every build
    pub build_id: String,
    pub version: u32,
}

impl MetaFile {
    pub fn for_index(index: &Index, created_at: String) -> Self {
        Self {
            num_docs: index.num_docs(),
            num_terms: index.vocabulary().len(),
            num_cells: index.tfidf().num_cells(),
            created_at,
            build_id: Uuid::new_v4().to_string(),
            version: FORMAT_VERSION,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn vocabulary(&self) -> PathBuf { self.root.join("keywords.txt") }
    pub fn idf(&self) -> PathBuf { self.root.join("idf.txt") }
    pub fn tfidf(&self) -> PathBuf { self.root.join("tfidf.txt") }
    pub fn magnitudes(&self) -> PathBuf { self.root.join("magnitude.txt") }
    pub fn titles(&self) -> PathBuf { self.root.join("titles.txt") }
    pub fn urls(&self) -> PathBuf { self.root.join("urls.txt") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn texts_dir(&self) -> PathBuf { self.root.join("texts") }
    pub fn text(&self, doc_id: DocId) -> PathBuf { self.texts_dir().join(format!("{doc_id}.txt")) }

    /// Hidden sibling of the root, e.g. `.index.staging` next to `index`.
    fn sibling(&self, suffix: &str) -> Result<PathBuf> {
        let name = self
            .root
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| IndexError::InvalidIndexRoot(self.root.clone()))?;
        Ok(self.root.with_file_name(format!(".{name}.{suffix}")))
    }
}

/// Write every artifact of `index` plus one text file per document, then swap
/// the finished directory into `paths.root` so readers never observe a partial set.
///
/// `texts[i]` is the indexed text of document `i + 1`.
pub fn publish_index(paths: &IndexPaths, index: &Index, texts: &[&str], meta: &MetaFile) -> Result<()> {
    if texts.len() != index.num_docs() {
        return Err(IndexError::ArtifactSizeMismatch {
            artifact: "texts",
            expected: index.num_docs(),
            found: texts.len(),
        });
    }
    let staging = paths.sibling("staging")?;
    let retired = paths.sibling("old")?;
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    write_artifacts(&IndexPaths::new(&staging), index, texts, meta)?;

    if retired.exists() {
        fs::remove_dir_all(&retired)?;
    }
    if paths.root.exists() {
        fs::rename(&paths.root, &retired)?;
    }
    fs::rename(&staging, &paths.root)?;
    if retired.exists() {
        fs::remove_dir_all(&retired)?;
    }
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, "published index");
    Ok(())
}

/// Write the artifact files directly under `paths.root` without staging.
pub fn write_artifacts(paths: &IndexPaths, index: &Index, texts: &[&str], meta: &MetaFile) -> Result<()> {
    create_dir_all(paths.texts_dir())?;
    write_lines(&paths.vocabulary(), index.vocabulary().terms().iter().map(String::as_str))?;
    write_floats(&paths.idf(), index.idf().as_slice())?;
    write_tfidf(&paths.tfidf(), index.tfidf())?;
    write_floats(&paths.magnitudes(), index.magnitudes().as_slice())?;
    let titles: Vec<String> = index.docs().iter().map(|d| single_line(&d.title)).collect();
    write_lines(&paths.titles(), titles.iter().map(String::as_str))?;
    let urls: Vec<String> = index
        .docs()
        .iter()
        .map(|d| d.url.as_deref().map(single_line).unwrap_or_default())
        .collect();
    write_lines(&paths.urls(), urls.iter().map(String::as_str))?;
    for (i, text) in texts.iter().enumerate() {
        fs::write(paths.text((i + 1) as DocId), text)?;
    }
    let json = serde_json::to_string_pretty(meta).map_err(std::io::Error::from)?;
    fs::write(paths.meta(), json)?;
    Ok(())
}

/// Load and cross-check the artifact set under `paths.root`.
///
/// The manifest is read again after the last artifact; if a publish swapped
/// the directory in between, the load fails instead of mixing two builds.
pub fn load_index(paths: &IndexPaths) -> Result<Index> {
    let meta = load_meta(paths)?;
    let index = read_artifacts(paths, &meta)?;
    ensure_same_build(paths, &meta)?;
    tracing::info!(
        root = %paths.root.display(),
        build_id = %meta.build_id,
        num_docs = index.num_docs(),
        num_terms = index.vocabulary().len(),
        "loaded index"
    );
    Ok(index)
}

fn ensure_same_build(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    let current = load_meta(paths)?;
    if current.build_id != meta.build_id {
        return Err(IndexError::BuildChanged {
            root: paths.root.clone(),
            expected: meta.build_id.clone(),
            found: current.build_id,
        });
    }
    Ok(())
}

fn read_artifacts(paths: &IndexPaths, meta: &MetaFile) -> Result<Index> {
    let vocabulary = Vocabulary::from_sorted_terms(read_lines(&paths.vocabulary())?, &paths.vocabulary())?;
    let idf = IdfVector::from_weights(read_floats(&paths.idf())?);
    let magnitudes = Magnitudes::from_values(read_floats(&paths.magnitudes())?);
    let titles = read_lines(&paths.titles())?;
    let urls = read_lines(&paths.urls())?;

    if meta.version != FORMAT_VERSION {
        return Err(IndexError::MalformedArtifact {
            path: paths.meta(),
            line: 1,
            reason: format!("unsupported format version {}", meta.version),
        });
    }
    if meta.num_terms != vocabulary.len() {
        return Err(IndexError::ArtifactSizeMismatch {
            artifact: "vocabulary",
            expected: meta.num_terms,
            found: vocabulary.len(),
        });
    }
    for (artifact, found) in [("titles", titles.len()), ("urls", urls.len())] {
        if found != meta.num_docs {
            return Err(IndexError::ArtifactSizeMismatch { artifact, expected: meta.num_docs, found });
        }
    }

    let tfidf = read_tfidf(&paths.tfidf(), meta.num_docs, vocabulary.len())?;
    let docs: Vec<DocMeta> = titles
        .into_iter()
        .zip(urls)
        .map(|(title, url)| DocMeta { title, url: (!url.is_empty()).then_some(url) })
        .collect();
    Index::from_parts(vocabulary, idf, tfidf, magnitudes, docs)
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let path = paths.meta();
    let buf = fs::read_to_string(&path).map_err(|source| IndexError::MissingArtifact { path: path.clone(), source })?;
    serde_json::from_str(&buf).map_err(|e| IndexError::MalformedArtifact {
        path,
        line: e.line(),
        reason: e.to_string(),
    })
}

/// Stored text of `doc_id`, newlines flattened and cut to `max_chars` characters.
/// `Ok(None)` when no text was stored for the document or it is empty; any
/// other read failure is an error.
pub fn load_snippet(paths: &IndexPaths, doc_id: DocId, max_chars: usize) -> Result<Option<String>> {
    let text = match fs::read_to_string(paths.text(doc_id)) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let flat = single_line(text.trim());
    if flat.is_empty() {
        return Ok(None);
    }
    let mut snippet: String = flat.chars().take(max_chars).collect();
    if flat.chars().count() > max_chars {
        snippet.push_str("...");
    }
    Ok(Some(snippet))
}

fn single_line(s: &str) -> String {
    s.split(['\r', '\n']).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
}

fn write_lines<'a, I: IntoIterator<Item = &'a str>>(path: &Path, lines: I) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(w, "{line}")?;
    }
    w.flush()?;
    Ok(())
}

fn write_floats(path: &Path, values: &[f64]) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    for v in values {
        writeln!(w, "{v:.6}")?;
    }
    w.flush()?;
    Ok(())
}

fn write_tfidf(path: &Path, tfidf: &TfidfMatrix) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    for (doc_id, term, weight) in tfidf.triples() {
        writeln!(w, "{doc_id} {term} {weight:.6}")?;
    }
    w.flush()?;
    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| IndexError::MissingArtifact { path: path.to_path_buf(), source })
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in open(path)?.lines() {
        let line = line.map_err(|source| IndexError::MissingArtifact { path: path.to_path_buf(), source })?;
        lines.push(line.trim_end_matches('\r').to_string());
    }
    Ok(lines)
}

fn parse_weight(path: &Path, line: usize, raw: &str) -> Result<f64> {
    let malformed = |reason: String| IndexError::MalformedArtifact { path: path.to_path_buf(), line, reason };
    let v: f64 = raw.trim().parse().map_err(|e| malformed(format!("{raw:?}: {e}")))?;
    if !v.is_finite() || v < 0.0 {
        return Err(malformed(format!("weight {v} is not a finite non-negative number")));
    }
    Ok(v)
}

fn read_floats(path: &Path) -> Result<Vec<f64>> {
    read_lines(path)?
        .iter()
        .enumerate()
        .map(|(i, raw)| parse_weight(path, i + 1, raw))
        .collect()
}

fn read_tfidf(path: &Path, num_docs: usize, num_terms: usize) -> Result<TfidfMatrix> {
    let mut triples: Vec<(DocId, TermId, f64)> = Vec::new();
    for (i, raw) in read_lines(path)?.iter().enumerate() {
        let line = i + 1;
        if raw.trim().is_empty() { continue; }
        let malformed = |reason: String| IndexError::MalformedArtifact { path: path.to_path_buf(), line, reason };
        let fields: Vec<&str> = raw.split_whitespace().collect();
        let [doc, term, weight] = fields[..] else {
            return Err(malformed(format!("expected 3 fields, found {}", fields.len())));
        };
        let doc_id: DocId = doc.parse().map_err(|e| malformed(format!("document ordinal {doc:?}: {e}")))?;
        let term_id: TermId = term.parse().map_err(|e| malformed(format!("term index {term:?}: {e}")))?;
        let weight = parse_weight(path, line, weight)?;
        triples.push((doc_id, term_id, weight));
    }
    TfidfMatrix::from_triples(num_docs, num_terms, triples)
}
