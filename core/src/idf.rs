use crate::tf::TfMatrix;
use crate::TermId;

/// `1 + log10(n_docs / df)`, or 0 when the term occurs in no document.
pub fn idf(n_docs: usize, df: u32) -> f64 {
    if df == 0 || n_docs == 0 {
        return 0.0;
    }
    1.0 + (n_docs as f64 / df as f64).log10()
}

/// One IDF weight per vocabulary term, indexed by `TermId`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdfVector {
    weights: Vec<f64>,
}

impl IdfVector {
    pub fn compute(tf: &TfMatrix) -> Self {
        let n = tf.num_docs();
        let weights = tf.document_frequencies().into_iter().map(|df| idf(n, df)).collect();
        Self { weights }
    }

    pub fn from_weights(weights: Vec<f64>) -> Self { Self { weights } }

    /// Weight of `term`; terms outside the vector weigh 0.
    pub fn get(&self, term: TermId) -> f64 { self.weights.get(term as usize).copied().unwrap_or(0.0) }

    pub fn len(&self) -> usize { self.weights.len() }

    pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    pub fn as_slice(&self) -> &[f64] { &self.weights }
}
