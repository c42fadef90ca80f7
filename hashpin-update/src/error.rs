//! Error types for hashpin-update.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while updating workflow files.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating a `.bak` copy failed. Backups made earlier in the same run
    /// have already been removed.
    #[error("failed to create backup for {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested target is not a scanned workflow file with references.
    #[error("{path} is not a workflow file with action references")]
    UnknownTarget { path: PathBuf },

    /// Reading the operator's answer failed.
    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),
}

/// Convenience constructor for [`UpdateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> UpdateError {
    UpdateError::Io {
        path: path.into(),
        source,
    }
}
