//! Decide which references need an update.
//!
//! Each reference gets its latest release tag and commit. Symbolic refs are
//! resolved to their current commit first. A failure on one reference is
//! recorded and the rest of the run continues.

use std::collections::HashMap;

use hashpin_core::{ActionReference, CommitId, RepoId, WorkflowActionSet};
use hashpin_registry::{RegistryError, ResolveRef};

/// A reference that could not be checked. It keeps `needs_update == false`.
#[derive(Debug)]
pub struct SkippedReference {
    /// `file:line repo@ref`
    pub location: String,
    pub error: RegistryError,
}

#[derive(Debug, Default)]
pub struct PlanReport {
    pub checked: usize,
    pub up_to_date: usize,
    pub needs_update: usize,
    pub skipped: Vec<SkippedReference>,
}

/// Planner with per-invocation memoisation of successful lookups.
pub struct Planner<'r, R: ?Sized> {
    resolver: &'r R,
    latest: HashMap<RepoId, (String, CommitId)>,
    commits: HashMap<(RepoId, String), CommitId>,
}

impl<'r, R: ResolveRef + ?Sized> Planner<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        Self {
            resolver,
            latest: HashMap::new(),
            commits: HashMap::new(),
        }
    }

    pub fn plan(&mut self, set: &mut WorkflowActionSet) -> PlanReport {
        self.plan_with(set, |_, _| {})
    }

    /// Plan every reference, calling `on_checked` after each one.
    pub fn plan_with(
        &mut self,
        set: &mut WorkflowActionSet,
        mut on_checked: impl FnMut(&ActionReference, Option<&RegistryError>),
    ) -> PlanReport {
        let mut report = PlanReport::default();
        for (_, references) in set.iter_mut() {
            for reference in references.iter_mut() {
                report.checked += 1;
                match self.plan_reference(reference) {
                    Ok(()) => {
                        if reference.needs_update {
                            report.needs_update += 1;
                        } else {
                            report.up_to_date += 1;
                        }
                        on_checked(reference, None);
                    }
                    Err(error) => {
                        tracing::warn!(
                            reference = %reference.location(),
                            error = %error,
                            "skipping reference"
                        );
                        on_checked(reference, Some(&error));
                        report.skipped.push(SkippedReference {
                            location: reference.location(),
                            error,
                        });
                    }
                }
            }
        }
        report
    }

    /// Fill `latest_*`, `current_commit`, and `needs_update` for one reference.
    pub fn plan_reference(&mut self, reference: &mut ActionReference) -> Result<(), RegistryError> {
        reference.needs_update = false;
        let repo = reference
            .repo_id()
            .ok_or_else(|| RegistryError::InvalidRepo {
                repo_path: reference.repo_path.clone(),
            })?;

        let (latest_tag, latest_commit) = self.latest(&repo)?;
        reference.latest_tag = Some(latest_tag);
        reference.latest_commit = Some(latest_commit.clone());

        let current = match &reference.current_commit {
            Some(commit) => commit.clone(),
            None => {
                let commit = self.commit(&repo, &reference.current_ref)?;
                reference.current_commit = Some(commit.clone());
                commit
            }
        };

        reference.needs_update = current != latest_commit;
        Ok(())
    }

    fn latest(&mut self, repo: &RepoId) -> Result<(String, CommitId), RegistryError> {
        if let Some(hit) = self.latest.get(repo) {
            return Ok(hit.clone());
        }
        let tag = self.resolver.latest_release(repo)?;
        let commit = self.commit(repo, &tag)?;
        self.latest
            .insert(repo.clone(), (tag.clone(), commit.clone()));
        Ok((tag, commit))
    }

    fn commit(&mut self, repo: &RepoId, reference: &str) -> Result<CommitId, RegistryError> {
        let key = (repo.clone(), reference.to_string());
        if let Some(hit) = self.commits.get(&key) {
            return Ok(hit.clone());
        }
        let commit = self.resolver.resolve_commit(repo, reference)?;
        self.commits.insert(key, commit.clone());
        Ok(commit)
    }
}

/// Plan `set` in place with a fresh [`Planner`].
pub fn plan<R: ResolveRef + ?Sized>(set: &mut WorkflowActionSet, resolver: &R) -> PlanReport {
    Planner::new(resolver).plan(set)
}
