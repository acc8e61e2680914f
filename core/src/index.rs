use crate::error::{IndexError, Result};
use crate::idf::IdfVector;
use crate::magnitude::Magnitudes;
use crate::query::{self, QueryVector, TermMatch};
use crate::rank::{rank, DEFAULT_LIMIT, MAX_LIMIT};
use crate::tf::TfMatrix;
use crate::tfidf::TfidfMatrix;
use crate::tokenizer::tokenize;
use crate::vocab::Vocabulary;
use serde::{Deserialize, Serialize};

pub type TermId = u32;
/// 1-based document ordinal in corpus order.
pub type DocId = u32;

/// A corpus entry as supplied by the ingestion side.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub url: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMeta {
    pub title: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub title: String,
    pub url: Option<String>,
    /// Cosine similarity rounded to 4 decimals
    pub score: f64,
}

/// The artifact set of one build: vocabulary, IDF, TF-IDF, magnitudes and
/// document metadata. Always constructed whole and size-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    vocabulary: Vocabulary,
    idf: IdfVector,
    tfidf: TfidfMatrix,
    magnitudes: Magnitudes,
    docs: Vec<DocMeta>,
}

impl Index {
    /// Run the full pipeline over `corpus`. Document `i` (0-based) gets `DocId` `i + 1`.
    pub fn build(corpus: &[Document]) -> Result<Self> {
        let tokenized: Vec<Vec<String>> = corpus.iter().map(|d| tokenize(&d.body)).collect();
        let vocabulary = Vocabulary::from_token_streams(&tokenized);
        let tf = TfMatrix::build(&tokenized, &vocabulary);
        let idf = IdfVector::compute(&tf);
        let tfidf = TfidfMatrix::build(&tf, &idf)?;
        let magnitudes = Magnitudes::compute(&tfidf);
        let docs = corpus
            .iter()
            .map(|d| DocMeta { title: d.title.clone(), url: d.url.clone() })
            .collect();
        tracing::info!(
            num_docs = corpus.len(),
            num_terms = vocabulary.len(),
            num_cells = tfidf.num_cells(),
            "built index"
        );
        Self::from_parts(vocabulary, idf, tfidf, magnitudes, docs)
    }

    pub fn from_parts(
        vocabulary: Vocabulary,
        idf: IdfVector,
        tfidf: TfidfMatrix,
        magnitudes: Magnitudes,
        docs: Vec<DocMeta>,
    ) -> Result<Self> {
        check_size("idf", vocabulary.len(), idf.len())?;
        check_size("tfidf columns", vocabulary.len(), tfidf.num_terms())?;
        check_size("tfidf rows", docs.len(), tfidf.num_docs())?;
        check_size("magnitudes", docs.len(), magnitudes.len())?;
        Ok(Self { vocabulary, idf, tfidf, magnitudes, docs })
    }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub fn idf(&self) -> &IdfVector { &self.idf }

    pub fn tfidf(&self) -> &TfidfMatrix { &self.tfidf }

    pub fn magnitudes(&self) -> &Magnitudes { &self.magnitudes }

    pub fn docs(&self) -> &[DocMeta] { &self.docs }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn doc(&self, doc_id: DocId) -> Option<&DocMeta> {
        (doc_id as usize).checked_sub(1).and_then(|i| self.docs.get(i))
    }

    pub fn query_vector(&self, query: &str) -> QueryVector {
        QueryVector::new(query, &self.vocabulary, &self.idf)
    }

    /// Ranked hits for `query`. `limit` defaults to 10 and is clamped to 1..=100.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Vec<SearchHit> {
        let k = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let q = self.query_vector(query);
        if q.is_empty() {
            tracing::debug!(query, "no recognized query terms");
            return Vec::new();
        }
        let hits: Vec<SearchHit> = rank(&q, &self.tfidf, &self.magnitudes, k)
            .into_iter()
            .filter_map(|s| {
                let meta = self.doc(s.doc_id)?;
                Some(SearchHit {
                    doc_id: s.doc_id,
                    title: meta.title.clone(),
                    url: meta.url.clone(),
                    score: round4(s.score),
                })
            })
            .collect();
        tracing::debug!(query, terms = q.weights().len(), hits = hits.len(), "search complete");
        hits
    }

    pub fn explain(&self, query: &str) -> Vec<TermMatch> {
        let matches = query::explain(query, &self.vocabulary, &self.idf);
        for m in &matches {
            tracing::debug!(term = %m.term, term_id = m.term_id, tf = m.tf, idf = m.idf, weight = m.weight, "matched term");
        }
        matches
    }
}

fn check_size(artifact: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(IndexError::ArtifactSizeMismatch { artifact, expected, found });
    }
    Ok(())
}

fn round4(score: f64) -> f64 { (score * 10_000.0).round() / 10_000.0 }
