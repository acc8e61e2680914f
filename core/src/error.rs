//! Index error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, publishing or loading an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A required artifact file is absent or unreadable
    #[error("missing index artifact {}: {source}", .path.display())]
    MissingArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two artifacts from the same build disagree on a dimension
    #[error("artifact size mismatch in {artifact}: expected {expected}, found {found}")]
    ArtifactSizeMismatch {
        artifact: &'static str,
        expected: usize,
        found: usize,
    },

    /// An artifact line could not be parsed or holds an invalid value
    #[error("malformed artifact {}:{line}: {reason}", .path.display())]
    MalformedArtifact {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The manifest changed between the start and end of a load
    #[error("index at {} was republished while loading (build {expected} replaced by {found})", .root.display())]
    BuildChanged {
        root: PathBuf,
        expected: String,
        found: String,
    },

    /// A sparse matrix cell was given more than once
    #[error("duplicate tfidf cell (document {doc_id}, term {term_id})")]
    DuplicateCell {
        doc_id: u32,
        term_id: u32,
    },

    /// The index root has no directory name to stage a build next to
    #[error("invalid index root: {}", .0.display())]
    InvalidIndexRoot(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;
