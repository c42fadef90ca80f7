//! Error types for hashpin-registry.

use thiserror::Error;

use hashpin_core::RepoId;

/// All errors that can arise while resolving references against GitHub.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The repository has no published release (or does not exist).
    #[error("no release found for {repo}")]
    NotFound { repo: RepoId },

    /// No annotated tag, lightweight tag, or branch matches the ref.
    #[error("could not resolve ref '{reference}' for {repo}")]
    Unresolvable { repo: RepoId, reference: String },

    /// The reference path does not name an `owner/repo`.
    #[error("invalid repository path '{repo_path}' (expected owner/repo)")]
    InvalidRepo { repo_path: String },

    /// The API answered with something that is not a commit identifier.
    #[error("{repo} returned malformed commit id '{sha}'")]
    InvalidCommit { repo: RepoId, sha: String },

    #[error("GitHub API rate limit exceeded{}", reset_hint(.reset))]
    RateLimited { reset: Option<u64> },

    #[error("GitHub API returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

fn reset_hint(reset: &Option<u64>) -> String {
    match reset {
        Some(epoch) => format!(" (resets at unix time {epoch}; set GITHUB_TOKEN for a higher limit)"),
        None => " (set GITHUB_TOKEN for a higher limit)".to_string(),
    }
}
