//! TF-IDF indexing and cosine-similarity ranking over a static corpus.

pub mod error;
pub mod idf;
pub mod index;
pub mod magnitude;
pub mod numerals;
pub mod persist;
pub mod query;
pub mod rank;
pub mod tf;
pub mod tfidf;
pub mod tokenizer;
pub mod vocab;

pub use error::{IndexError, Result};
pub use index::{DocId, DocMeta, Document, Index, SearchHit, TermId};
