//! Domain types for workflow action references.
//!
//! Everything here is rebuilt on each invocation from the workflow files on
//! disk; nothing is persisted between runs.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// An immutable commit identifier: exactly 40 lowercase hex characters.
///
/// Opaque and comparable; never parsed any further.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    /// Length of a commit identifier in characters.
    pub const LEN: usize = 40;

    /// Returns `None` unless `s` has the commit-identifier shape.
    pub fn parse(s: &str) -> Option<Self> {
        is_commit_shaped(s).then(|| Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form used in terminal output.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `true` when `s` is 40 lowercase hex characters.
pub fn is_commit_shaped(s: &str) -> bool {
    s.len() == CommitId::LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Repository identity used for every registry lookup: `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Identity of a reference path. Composite actions addressed as
    /// `owner/repo/sub/path` resolve against the first two segments.
    pub fn from_repo_path(path: &str) -> Option<Self> {
        let mut parts = path.split('/');
        let owner = parts.next().filter(|s| !s.is_empty())?;
        let repo = parts.next().filter(|s| !s.is_empty())?;
        Some(Self::new(owner, repo))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

// ---------------------------------------------------------------------------
// ActionReference
// ---------------------------------------------------------------------------

/// One `uses: owner/repo@ref` occurrence in one workflow file.
///
/// Created by the parser, enriched in place by the planner, read by the
/// writer and the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReference {
    /// `owner/repo`, possibly followed by a sub-path.
    pub repo_path: String,
    /// Tag or branch name, or a commit identifier.
    pub current_ref: String,
    /// Token of the trailing `# comment`, if any.
    pub comment: Option<String>,
    /// Set when `current_ref` is commit-shaped or once the planner resolved it.
    pub current_commit: Option<CommitId>,
    pub latest_tag: Option<String>,
    pub latest_commit: Option<CommitId>,
    pub needs_update: bool,
    /// 1-based.
    pub line_number: usize,
    pub original_line: String,
    pub source_file: PathBuf,
    #[serde(skip)]
    pub(crate) repo_start: usize,
    #[serde(skip)]
    pub(crate) pin: Range<usize>,
}

impl ActionReference {
    /// Repository identity, or `None` when the path has fewer than two segments.
    pub fn repo_id(&self) -> Option<RepoId> {
        RepoId::from_repo_path(&self.repo_path)
    }

    /// `true` when the ref in the file is already a commit identifier.
    pub fn is_pinned(&self) -> bool {
        is_commit_shaped(&self.current_ref)
    }

    /// Everything before the repo path (indentation, list marker, `uses:`).
    pub fn prefix(&self) -> &str {
        &self.original_line[..self.repo_start]
    }

    /// The `@ref[ # comment]` section, exactly as written.
    pub fn pin_section(&self) -> &str {
        &self.original_line[self.pin.clone()]
    }

    /// What follows the ref in [`pin_section`](Self::pin_section): a closing
    /// quote and the comment, separator included.
    pub fn comment_section(&self) -> &str {
        &self.pin_section()[1 + self.current_ref.len()..]
    }

    /// Everything after the pin section.
    pub fn suffix(&self) -> &str {
        &self.original_line[self.pin.end..]
    }

    /// `file:line repo@ref`, the form used in every report.
    pub fn location(&self) -> String {
        format!(
            "{}:{} {}@{}",
            self.source_file.display(),
            self.line_number,
            self.repo_path,
            self.current_ref
        )
    }
}

// ---------------------------------------------------------------------------
// WorkflowActionSet
// ---------------------------------------------------------------------------

/// References found per workflow file.
///
/// Files are ordered by path; references within a file keep line order.
/// Only files with at least one reference are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorkflowActionSet(BTreeMap<PathBuf, Vec<ActionReference>>);

impl WorkflowActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: PathBuf, references: Vec<ActionReference>) {
        self.0.insert(path, references);
    }

    pub fn get(&self, path: &Path) -> Option<&[ActionReference]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.0.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[ActionReference])> {
        self.0.iter().map(|(p, refs)| (p.as_path(), refs.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Path, &mut Vec<ActionReference>)> {
        self.0.iter_mut().map(|(p, refs)| (p.as_path(), refs))
    }

    /// Every reference across every file, in file then line order.
    pub fn references(&self) -> impl Iterator<Item = &ActionReference> {
        self.0.values().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn reference_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Files with at least one reference flagged for update, in path order.
    pub fn files_needing_update(&self) -> Vec<&Path> {
        self.0
            .iter()
            .filter(|(_, refs)| refs.iter().any(|r| r.needs_update))
            .map(|(p, _)| p.as_path())
            .collect()
    }
}
