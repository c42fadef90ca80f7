//! Two-tier resolution: latest release tag, then tag or branch to commit.
//!
//! ## `resolve_commit` order
//!
//! 1. Apply the repository's ref rewrite, if any.
//! 2. `refs/tags/<ref>` pointing at a tag object: annotated tag, peel one level.
//! 3. `refs/tags/<ref>` pointing at a commit: lightweight tag.
//! 4. `refs/heads/<ref>`: branch head.
//!
//! The first hit wins; otherwise [`RegistryError::Unresolvable`].

use hashpin_core::{CommitId, RepoId};

use crate::api::{GitHubApi, GitObject, ObjectKind, RefNamespace};
use crate::error::RegistryError;
use crate::rewrite::RefRewriteTable;

/// What the planner needs from a registry.
pub trait ResolveRef {
    /// Tag of the latest stable release.
    fn latest_release(&self, repo: &RepoId) -> Result<String, RegistryError>;

    /// Commit a tag or branch name points at.
    fn resolve_commit(&self, repo: &RepoId, reference: &str) -> Result<CommitId, RegistryError>;
}

pub struct Resolver<A> {
    api: A,
    rewrites: RefRewriteTable,
}

impl<A: GitHubApi> Resolver<A> {
    /// Resolver with the built-in rewrite table.
    pub fn new(api: A) -> Self {
        Self::with_rewrites(api, RefRewriteTable::builtin())
    }

    pub fn with_rewrites(api: A, rewrites: RefRewriteTable) -> Self {
        Self { api, rewrites }
    }

    fn resolve_tag(&self, repo: &RepoId, name: &str) -> Result<Option<CommitId>, RegistryError> {
        let Some(tag_ref) = self.api.git_ref(repo, RefNamespace::Tags, name)? else {
            return Ok(None);
        };

        match tag_ref.object.kind {
            ObjectKind::Tag => {
                let Some(target) = self.api.tag_target(repo, &tag_ref.object.sha)? else {
                    tracing::warn!(%repo, tag = name, "annotated tag object missing");
                    return Ok(None);
                };
                tracing::debug!(%repo, tag = name, "peeled annotated tag");
                commit_of(repo, name, target)
            }
            _ => commit_of(repo, name, tag_ref.object),
        }
    }
}

impl<A: GitHubApi> ResolveRef for Resolver<A> {
    fn latest_release(&self, repo: &RepoId) -> Result<String, RegistryError> {
        match self.api.fetch_latest_release(repo)? {
            Some(release) => Ok(release.tag_name),
            None => Err(RegistryError::NotFound { repo: repo.clone() }),
        }
    }

    fn resolve_commit(&self, repo: &RepoId, reference: &str) -> Result<CommitId, RegistryError> {
        let lookup = self.rewrites.rewrite(repo, reference);
        if lookup != reference {
            tracing::debug!(%repo, from = reference, to = %lookup, "rewrote ref");
        }

        if let Some(commit) = self.resolve_tag(repo, &lookup)? {
            return Ok(commit);
        }
        if let Some(head) = self.api.git_ref(repo, RefNamespace::Heads, &lookup)? {
            if let Some(commit) = commit_of(repo, &lookup, head.object)? {
                return Ok(commit);
            }
        }

        Err(RegistryError::Unresolvable {
            repo: repo.clone(),
            reference: lookup.into_owned(),
        })
    }
}

/// Accept only commit targets. Anything else (a tag nested in a tag, a tree)
/// is not a pin target and falls through.
fn commit_of(
    repo: &RepoId,
    name: &str,
    object: GitObject,
) -> Result<Option<CommitId>, RegistryError> {
    if object.kind != ObjectKind::Commit {
        tracing::warn!(%repo, reference = name, kind = ?object.kind, "ref does not point at a commit");
        return Ok(None);
    }
    CommitId::parse(&object.sha)
        .map(Some)
        .ok_or_else(|| RegistryError::InvalidCommit {
            repo: repo.clone(),
            sha: object.sha,
        })
}
