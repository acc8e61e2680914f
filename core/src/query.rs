use crate::idf::IdfVector;
use crate::tf::term_frequencies;
use crate::tokenizer::tokenize;
use crate::vocab::Vocabulary;
use crate::TermId;
use serde::Serialize;

/// Sparse TF-IDF weights of a single query plus their Euclidean norm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    weights: Vec<(TermId, f64)>,
    norm: f64,
}

impl QueryVector {
    pub fn new(query: &str, vocab: &Vocabulary, idf: &IdfVector) -> Self {
        Self::from_tokens(&tokenize(query), vocab, idf)
    }

    /// TF is taken over the query's own tokens and weighted by the corpus IDF.
    /// Tokens outside the vocabulary contribute nothing.
    pub fn from_tokens(tokens: &[String], vocab: &Vocabulary, idf: &IdfVector) -> Self {
        let tf = term_frequencies(tokens, vocab);
        let weights: Vec<(TermId, f64)> = tf
            .cells()
            .iter()
            .filter_map(|&(term, f)| {
                let w = f * idf.get(term);
                (w > 0.0).then_some((term, w))
            })
            .collect();
        let norm = weights.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        Self { weights, norm }
    }

    pub fn weights(&self) -> &[(TermId, f64)] { &self.weights }

    pub fn norm(&self) -> f64 { self.norm }

    /// True when no query term is recognized.
    pub fn is_empty(&self) -> bool { self.weights.is_empty() }
}

/// How one recognized query term was weighted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermMatch {
    pub term: String,
    pub term_id: TermId,
    pub tf: f64,
    pub idf: f64,
    pub weight: f64,
}

/// Per-term breakdown of the query vector, in `TermId` order.
pub fn explain(query: &str, vocab: &Vocabulary, idf: &IdfVector) -> Vec<TermMatch> {
    let tf = term_frequencies(&tokenize(query), vocab);
    tf.cells()
        .iter()
        .filter_map(|&(term_id, f)| {
            let term = vocab.term(term_id)?.to_string();
            let idf = idf.get(term_id);
            Some(TermMatch { term, term_id, tf: f, idf, weight: f * idf })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Vocabulary, IdfVector) {
        let vocab = Vocabulary::from_sorted_terms(
            vec!["coins".into(), "minimum".into(), "two".into()],
            std::path::Path::new("keywords.txt"),
        )
        .unwrap();
        (vocab, IdfVector::from_weights(vec![2.0, 1.5, 0.0]))
    }

    #[test]
    fn weights_use_query_length_and_corpus_idf() {
        let (vocab, idf) = fixture();
        let q = QueryVector::new("minimum coins unknown coins", &vocab, &idf);
        assert_eq!(q.weights(), &[(0, 0.5 * 2.0), (1, 0.25 * 1.5)]);
        let expected = (1.0f64 + 0.375 * 0.375).sqrt();
        assert!((q.norm() - expected).abs() < 1e-12);
    }

    #[test]
    fn stopword_only_query_is_empty() {
        let (vocab, idf) = fixture();
        let q = QueryVector::new("the a of", &vocab, &idf);
        assert!(q.is_empty());
        assert_eq!(q.norm(), 0.0);
    }

    #[test]
    fn explain_reports_each_recognized_term() {
        let (vocab, idf) = fixture();
        let matches = explain("minimum 2 things", &vocab, &idf);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].term, "minimum");
        assert!((matches[0].tf - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(matches[1].term, "two");
        assert_eq!(matches[1].weight, 0.0);
    }
}
