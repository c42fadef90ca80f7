//! Error types for hashpin-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::verify::UnpinnedRef;

/// Errors from reading workflow files.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, annotated with the file or directory involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from `verify`.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Scan(#[from] CoreError),

    /// At least one reference uses a tag or branch instead of a commit.
    #[error("found {} unpinned action reference(s):\n{}", .refs.len(), list(.refs))]
    Unpinned { refs: Vec<UnpinnedRef> },

    /// Workflow files that could not be read, so their references are unknown.
    #[error("could not read {} workflow file(s):\n{}", .failures.len(), list(.failures))]
    Unreadable { failures: Vec<CoreError> },
}

fn list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|r| format!("  {r}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
