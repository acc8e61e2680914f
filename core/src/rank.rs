use crate::magnitude::Magnitudes;
use crate::query::QueryVector;
use crate::tfidf::TfidfMatrix;
use crate::{DocId, TermId};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Cosine similarity between a query and one document row.
///
/// Returns exactly 0 when either norm is 0. Only the query's terms are
/// looked up in the row.
pub fn cosine_similarity(query: &QueryVector, row: &[(TermId, f64)], doc_norm: f64) -> f64 {
    if query.norm() == 0.0 || doc_norm == 0.0 {
        return 0.0;
    }
    let dot: f64 = query
        .weights()
        .iter()
        .filter_map(|&(term, qw)| {
            row.binary_search_by_key(&term, |&(t, _)| t)
                .ok()
                .map(|i| qw * row[i].1)
        })
        .sum();
    let sim = dot / (query.norm() * doc_norm);
    // persisted weights are rounded, so the ratio can drift just past 1
    if sim.is_finite() { sim.clamp(0.0, 1.0) } else { 0.0 }
}

/// Top `k` documents by descending similarity, ties by ascending `DocId`.
/// Documents scoring 0 are left out.
pub fn rank(query: &QueryVector, tfidf: &TfidfMatrix, magnitudes: &Magnitudes, k: usize) -> Vec<ScoredDoc> {
    if query.is_empty() || k == 0 {
        return Vec::new();
    }
    let mut scored: Vec<ScoredDoc> = tfidf
        .rows()
        .map(|(doc_id, row)| ScoredDoc {
            doc_id,
            score: cosine_similarity(query, row, magnitudes.get(doc_id)),
        })
        .filter(|s| s.score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
    scored.truncate(k);
    scored
}
