use crate::vocab::Vocabulary;
use crate::{DocId, TermId};
use std::collections::BTreeMap;

/// Term frequencies of one token sequence, sparse and ordered by `TermId`.
///
/// Cells absent from the row are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfRow {
    cells: Vec<(TermId, f64)>,
}

impl TfRow {
    pub fn cells(&self) -> &[(TermId, f64)] { &self.cells }

    pub fn get(&self, term: TermId) -> f64 {
        self.cells
            .binary_search_by_key(&term, |&(t, _)| t)
            .map(|i| self.cells[i].1)
            .unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    pub fn sum(&self) -> f64 { self.cells.iter().map(|&(_, f)| f).sum() }
}

/// `count(term) / tokens.len()` for every token found in `vocab`.
///
/// Tokens outside the vocabulary still count toward the denominator.
pub fn term_frequencies(tokens: &[String], vocab: &Vocabulary) -> TfRow {
    if tokens.is_empty() {
        return TfRow::default();
    }
    let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
    for token in tokens {
        if let Some(id) = vocab.get(token) {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    let total = tokens.len() as f64;
    let cells = counts
        .into_iter()
        .map(|(id, count)| (id, count as f64 / total))
        .collect();
    TfRow { cells }
}

/// One TF row per document, in corpus order.
#[derive(Debug, Clone, Default)]
pub struct TfMatrix {
    rows: Vec<TfRow>,
    num_terms: usize,
}

impl TfMatrix {
    pub fn build(tokenized: &[Vec<String>], vocab: &Vocabulary) -> Self {
        let rows = tokenized.iter().map(|tokens| term_frequencies(tokens, vocab)).collect();
        Self { rows, num_terms: vocab.len() }
    }

    pub fn num_docs(&self) -> usize { self.rows.len() }

    pub fn num_terms(&self) -> usize { self.num_terms }

    pub fn rows(&self) -> &[TfRow] { &self.rows }

    /// Row for a 1-based document ordinal.
    pub fn row(&self, doc_id: DocId) -> Option<&TfRow> {
        (doc_id as usize).checked_sub(1).and_then(|i| self.rows.get(i))
    }

    /// Number of documents in which each term has a non-zero frequency.
    pub fn document_frequencies(&self) -> Vec<u32> {
        let mut df = vec![0u32; self.num_terms];
        for row in &self.rows {
            for &(term, tf) in row.cells() {
                if tf > 0.0 {
                    df[term as usize] += 1;
                }
            }
        }
        df
    }
}
