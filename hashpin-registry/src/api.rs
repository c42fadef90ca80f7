//! GitHub REST API surface used for resolution, and its wire types.

use serde::Deserialize;

use hashpin_core::RepoId;

use crate::error::RegistryError;

/// Git object kinds a ref can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Commit,
    Tag,
    Tree,
    Blob,
}

/// Target of a ref or of an annotated tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitObject {
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
}

/// `GET /repos/{owner}/{repo}/git/ref/{namespace}/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

/// `GET /repos/{owner}/{repo}/git/tags/{sha}` (only the peeled target).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagObject {
    pub object: GitObject,
}

/// `GET /repos/{owner}/{repo}/releases/latest` (only the tag).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
}

/// Ref namespaces that resolution looks in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefNamespace {
    Tags,
    Heads,
}

impl RefNamespace {
    pub fn as_str(self) -> &'static str {
        match self {
            RefNamespace::Tags => "tags",
            RefNamespace::Heads => "heads",
        }
    }
}

/// The three GitHub calls resolution needs. Every "does not exist" answer is
/// `Ok(None)`; errors are reserved for transport, status, and decode failures.
pub trait GitHubApi {
    /// Latest stable (non-draft, non-prerelease) release.
    fn fetch_latest_release(&self, repo: &RepoId) -> Result<Option<Release>, RegistryError>;

    fn git_ref(
        &self,
        repo: &RepoId,
        namespace: RefNamespace,
        name: &str,
    ) -> Result<Option<GitRef>, RegistryError>;

    /// Peel one annotated tag object.
    fn tag_target(&self, repo: &RepoId, tag_sha: &str) -> Result<Option<GitObject>, RegistryError>;
}

impl<T: GitHubApi + ?Sized> GitHubApi for &T {
    fn fetch_latest_release(&self, repo: &RepoId) -> Result<Option<Release>, RegistryError> {
        (**self).fetch_latest_release(repo)
    }

    fn git_ref(
        &self,
        repo: &RepoId,
        namespace: RefNamespace,
        name: &str,
    ) -> Result<Option<GitRef>, RegistryError> {
        (**self).git_ref(repo, namespace, name)
    }

    fn tag_target(&self, repo: &RepoId, tag_sha: &str) -> Result<Option<GitObject>, RegistryError> {
        (**self).tag_target(repo, tag_sha)
    }
}
