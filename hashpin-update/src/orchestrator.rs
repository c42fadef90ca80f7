//! Backup, confirm, and apply across every file of one update run.
//!
//! ```text
//! Plan ──► Backup (all or nothing) ──► per file: Confirm ──► Apply
//!                                                   │          │ failure
//!                                                   ▼          ▼
//!                                                Declined   restore from .bak
//! ```
//!
//! Once Apply begins each file's outcome is independent: a later failure never
//! rolls back an earlier success. `.bak` files are left in place.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use hashpin_core::{ActionReference, WorkflowActionSet};

use crate::diff::preview_diff;
use crate::error::{io_err, UpdateError};
use crate::writer::{apply_file, pending_changes, ApplyResult, LineChange};

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Blocking yes/no confirmation for one file.
pub trait Prompt {
    fn confirm(
        &mut self,
        path: &Path,
        changes: &[LineChange],
        diff: &str,
    ) -> Result<bool, UpdateError>;
}

/// Answers yes to everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&mut self, _: &Path, _: &[LineChange], _: &str) -> Result<bool, UpdateError> {
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum FileOutcome {
    Applied { changes: Vec<LineChange> },
    /// Nothing left to rewrite; the file was not touched.
    AlreadyCurrent,
    Declined,
    /// Apply failed. `restore_error` is set if restoring from the backup also failed.
    Failed {
        error: UpdateError,
        restore_error: Option<UpdateError>,
    },
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub backup: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Default)]
pub struct UpdateReport {
    pub files: Vec<FileReport>,
}

impl UpdateReport {
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Applied { .. }))
    }

    pub fn declined(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Declined))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// `<path>.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Files with at least one flagged reference, optionally narrowed to `target`.
pub fn select_files<'a>(
    set: &'a WorkflowActionSet,
    target: Option<&Path>,
) -> Result<Vec<&'a Path>, UpdateError> {
    if let Some(target) = target {
        if !set.contains(target) {
            return Err(UpdateError::UnknownTarget {
                path: target.to_path_buf(),
            });
        }
    }
    Ok(set
        .files_needing_update()
        .into_iter()
        .filter(|p| target.map_or(true, |t| *p == t))
        .collect())
}

/// Copy every file to its `.bak` sibling, in order. On the first failure every
/// backup created by this call is removed and the error is returned.
pub fn create_backups(files: &[&Path]) -> Result<Vec<PathBuf>, UpdateError> {
    let mut created: Vec<PathBuf> = Vec::with_capacity(files.len());
    for file in files {
        let backup = backup_path(file);
        if let Err(source) = fs::copy(file, &backup) {
            for made in &created {
                if let Err(err) = fs::remove_file(made) {
                    tracing::warn!(error = %err, "failed to clean up backup {}", made.display());
                }
            }
            return Err(UpdateError::Backup {
                path: file.to_path_buf(),
                source,
            });
        }
        tracing::info!("backup: {}", backup.display());
        created.push(backup);
    }
    Ok(created)
}

fn restore(path: &Path, backup: &Path) -> Result<(), UpdateError> {
    fs::copy(backup, path).map_err(|e| io_err(path, e))?;
    tracing::warn!("restored {} from {}", path.display(), backup.display());
    Ok(())
}

fn failed(path: &Path, backup: &Path, error: UpdateError) -> FileOutcome {
    tracing::warn!(error = %error, "update of {} failed", path.display());
    FileOutcome::Failed {
        error,
        restore_error: restore(path, backup).err(),
    }
}

fn update_file(
    path: &Path,
    backup: &Path,
    references: &[ActionReference],
    prompt: &mut dyn Prompt,
) -> FileOutcome {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => return failed(path, backup, io_err(path, e)),
    };
    let changes = pending_changes(&text, references);
    if changes.is_empty() {
        return FileOutcome::AlreadyCurrent;
    }

    let diff = preview_diff(path, &text, &changes);
    match prompt.confirm(path, &changes, &diff) {
        Ok(true) => {}
        Ok(false) => return FileOutcome::Declined,
        Err(err) => {
            tracing::warn!(error = %err, "treating unanswered prompt as no");
            return FileOutcome::Declined;
        }
    }

    match apply_file(path, references) {
        Ok(ApplyResult::Written { changes, .. }) => FileOutcome::Applied { changes },
        Ok(ApplyResult::Unchanged { .. }) => FileOutcome::AlreadyCurrent,
        Err(error) => failed(path, backup, error),
    }
}

// ---------------------------------------------------------------------------
// run_update
// ---------------------------------------------------------------------------

/// Run the full update for a planned `set`.
///
/// Returns `Err` only for a bad target or a backup failure, in which case no
/// workflow file has been modified. Per-file apply failures are reported in
/// the [`UpdateReport`].
pub fn run_update(
    set: &WorkflowActionSet,
    target: Option<&Path>,
    prompt: &mut dyn Prompt,
) -> Result<UpdateReport, UpdateError> {
    let files = select_files(set, target)?;
    if files.is_empty() {
        return Ok(UpdateReport::default());
    }

    let backups = create_backups(&files)?;

    let mut report = UpdateReport::default();
    for (path, backup) in files.into_iter().zip(backups) {
        let references = set.get(path).unwrap_or_default();
        let outcome = update_file(path, &backup, references, prompt);
        report.files.push(FileReport {
            path: path.to_path_buf(),
            backup,
            outcome,
        });
    }
    Ok(report)
}
