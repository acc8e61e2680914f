use crate::tfidf::TfidfMatrix;
use crate::DocId;

/// Euclidean norm of each document's TF-IDF row, indexed by 1-based `DocId`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Magnitudes {
    values: Vec<f64>,
}

impl Magnitudes {
    pub fn compute(tfidf: &TfidfMatrix) -> Self {
        let values = tfidf
            .rows()
            .map(|(_, row)| row.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt())
            .collect();
        Self { values }
    }

    pub fn from_values(values: Vec<f64>) -> Self { Self { values } }

    /// Norm of `doc_id`; unknown documents have norm 0.
    pub fn get(&self, doc_id: DocId) -> f64 {
        (doc_id as usize)
            .checked_sub(1)
            .and_then(|i| self.values.get(i))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn as_slice(&self) -> &[f64] { &self.values }
}
