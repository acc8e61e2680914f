use crate::error::{IndexError, Result};
use crate::idf::IdfVector;
use crate::tf::TfMatrix;
use crate::{DocId, TermId};

/// Sparse document-by-term TF-IDF weights.
///
/// Rows are indexed by 1-based `DocId` and hold `(TermId, weight)` cells in
/// ascending term order. Only strictly positive weights are stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfidfMatrix {
    rows: Vec<Vec<(TermId, f64)>>,
    num_terms: usize,
}

impl TfidfMatrix {
    pub fn build(tf: &TfMatrix, idf: &IdfVector) -> Result<Self> {
        if tf.num_terms() != idf.len() {
            return Err(IndexError::ArtifactSizeMismatch {
                artifact: "idf",
                expected: tf.num_terms(),
                found: idf.len(),
            });
        }
        let rows = tf
            .rows()
            .iter()
            .map(|row| {
                row.cells()
                    .iter()
                    .filter_map(|&(term, f)| {
                        let w = idf.get(term);
                        (f > 0.0 && w > 0.0).then(|| (term, f * w))
                    })
                    .collect()
            })
            .collect();
        Ok(Self { rows, num_terms: tf.num_terms() })
    }

    /// Rebuild from `(doc_id, term_id, weight)` triples.
    ///
    /// Ordinals outside `1..=num_docs`, term ids at or beyond `num_terms` and
    /// cells given more than once are rejected. Zero weights are dropped.
    pub fn from_triples<I>(num_docs: usize, num_terms: usize, triples: I) -> Result<Self>
    where
        I: IntoIterator<Item = (DocId, TermId, f64)>,
    {
        let mut rows: Vec<Vec<(TermId, f64)>> = vec![Vec::new(); num_docs];
        for (doc_id, term, weight) in triples {
            if doc_id == 0 || doc_id as usize > num_docs {
                return Err(IndexError::ArtifactSizeMismatch {
                    artifact: "tfidf document ordinal",
                    expected: num_docs,
                    found: doc_id as usize,
                });
            }
            if term as usize >= num_terms {
                return Err(IndexError::ArtifactSizeMismatch {
                    artifact: "tfidf term index",
                    expected: num_terms,
                    found: term as usize,
                });
            }
            rows[doc_id as usize - 1].push((term, weight));
        }
        for (i, row) in rows.iter_mut().enumerate() {
            row.sort_by_key(|&(t, _)| t);
            if let Some(pair) = row.windows(2).find(|p| p[0].0 == p[1].0) {
                return Err(IndexError::DuplicateCell { doc_id: (i + 1) as DocId, term_id: pair[0].0 });
            }
            row.retain(|&(_, w)| w > 0.0);
        }
        Ok(Self { rows, num_terms })
    }

    pub fn num_docs(&self) -> usize { self.rows.len() }

    pub fn num_terms(&self) -> usize { self.num_terms }

    /// Number of stored (non-zero) cells.
    pub fn num_cells(&self) -> usize { self.rows.iter().map(Vec::len).sum() }

    pub fn row(&self, doc_id: DocId) -> Option<&[(TermId, f64)]> {
        (doc_id as usize)
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(Vec::as_slice)
    }

    pub fn get(&self, doc_id: DocId, term: TermId) -> f64 {
        self.row(doc_id)
            .and_then(|row| {
                row.binary_search_by_key(&term, |&(t, _)| t)
                    .ok()
                    .map(|i| row[i].1)
            })
            .unwrap_or(0.0)
    }

    /// Iterate rows with their 1-based ordinal.
    pub fn rows(&self) -> impl Iterator<Item = (DocId, &[(TermId, f64)])> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| ((i + 1) as DocId, row.as_slice()))
    }

    /// All stored cells as `(doc_id, term_id, weight)`, row-major.
    pub fn triples(&self) -> impl Iterator<Item = (DocId, TermId, f64)> + '_ {
        self.rows()
            .flat_map(|(doc_id, row)| row.iter().map(move |&(term, w)| (doc_id, term, w)))
    }
}
