use crate::error::{IndexError, Result};
use crate::TermId;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Sorted, deduplicated term list. A term's position is its `TermId`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    lookup: HashMap<String, TermId>,
}

impl Vocabulary {
    /// Union the tokens of every document into a lexicographically sorted vocabulary.
    pub fn from_token_streams(streams: &[Vec<String>]) -> Self {
        let set: BTreeSet<&str> = streams.iter().flatten().map(String::as_str).collect();
        let terms: Vec<String> = set.into_iter().map(str::to_string).collect();
        Self::from_terms_unchecked(terms)
    }

    /// Rebuild a vocabulary from persisted terms. `source` names the artifact in errors.
    pub fn from_sorted_terms(terms: Vec<String>, source: &Path) -> Result<Self> {
        for (i, pair) in terms.windows(2).enumerate() {
            if pair[0] >= pair[1] {
                return Err(IndexError::MalformedArtifact {
                    path: source.to_path_buf(),
                    line: i + 2,
                    reason: format!("term {:?} is not strictly after {:?}", pair[1], pair[0]),
                });
            }
        }
        Ok(Self::from_terms_unchecked(terms))
    }

    fn from_terms_unchecked(terms: Vec<String>) -> Self {
        let lookup = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as TermId))
            .collect();
        Self { terms, lookup }
    }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn get(&self, term: &str) -> Option<TermId> { self.lookup.get(term).copied() }

    pub fn term(&self, id: TermId) -> Option<&str> { self.terms.get(id as usize).map(String::as_str) }

    pub fn terms(&self) -> &[String] { &self.terms }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streams(docs: &[&[&str]]) -> Vec<Vec<String>> {
        docs.iter().map(|d| d.iter().map(|s| s.to_string()).collect()).collect()
    }

    #[test]
    fn sorted_and_deduplicated() {
        let v = Vocabulary::from_token_streams(&streams(&[&["pattern", "array", "array"], &["match", "array"]]));
        assert_eq!(v.terms(), &["array", "match", "pattern"]);
        assert_eq!(v.get("match"), Some(1));
        assert_eq!(v.term(2), Some("pattern"));
        assert_eq!(v.get("missing"), None);
    }

    #[test]
    fn rejects_unsorted_terms() {
        let terms = vec!["b".to_string(), "a".to_string()];
        let err = Vocabulary::from_sorted_terms(terms, Path::new("keywords.txt")).unwrap_err();
        assert!(matches!(err, IndexError::MalformedArtifact { line: 2, .. }));
    }

    #[test]
    fn rejects_duplicate_terms() {
        let terms = vec!["a".to_string(), "b".to_string(), "b".to_string()];
        assert!(Vocabulary::from_sorted_terms(terms, Path::new("keywords.txt")).is_err());
    }
}
