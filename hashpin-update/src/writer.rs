//! In-place rewriting of flagged reference lines.
//!
//! ## `apply_file` protocol
//!
//! 1. Read the file and recompute each flagged line's rewrite.
//! 2. No rewrite differs from the current line → `Unchanged`, nothing written.
//! 3. Replace affected lines in descending line order; every other byte is kept.
//! 4. Write to `<path>.hashpin.tmp`, created with the original permissions.
//! 5. Rename over the original.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hashpin_core::{parse_line, ActionReference, CommitId};

use crate::error::{io_err, UpdateError};

// ---------------------------------------------------------------------------
// Line changes
// ---------------------------------------------------------------------------

/// One pending or applied rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    pub line_number: usize,
    pub repo_path: String,
    pub from_ref: String,
    pub to_tag: String,
    pub to_commit: CommitId,
    pub old_line: String,
    pub new_line: String,
}

/// Outcome of [`apply_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// Lines were rewritten (listed in descending line order).
    Written {
        path: PathBuf,
        changes: Vec<LineChange>,
    },
    /// Every flagged line already carries its target; the file was not touched.
    Unchanged { path: PathBuf },
}

/// Rewrites `text` would receive, in descending line order.
///
/// Each flagged reference is re-recognised against the line currently at its
/// line number; a line that no longer references the same action is left
/// alone.
pub fn pending_changes(text: &str, references: &[ActionReference]) -> Vec<LineChange> {
    let lines: Vec<&str> = text.split('\n').collect();

    let mut flagged: Vec<&ActionReference> = references.iter().filter(|r| r.needs_update).collect();
    flagged.sort_by(|a, b| b.line_number.cmp(&a.line_number));
    flagged.dedup_by_key(|r| r.line_number);

    flagged
        .into_iter()
        .filter_map(|r| rewrite_line(&lines, r))
        .collect()
}

fn rewrite_line(lines: &[&str], reference: &ActionReference) -> Option<LineChange> {
    let (Some(tag), Some(commit)) = (&reference.latest_tag, &reference.latest_commit) else {
        tracing::warn!(reference = %reference.location(), "flagged without a resolved target");
        return None;
    };

    let current = *lines.get(reference.line_number.checked_sub(1)?)?;
    let Some(parsed) = parse_line(current).filter(|p| p.repo_path() == reference.repo_path) else {
        tracing::warn!(
            reference = %reference.location(),
            "line no longer holds this reference; leaving it alone"
        );
        return None;
    };

    let new_line = parsed.pinned(commit, tag);
    (new_line != current).then(|| LineChange {
        line_number: reference.line_number,
        repo_path: reference.repo_path.clone(),
        from_ref: parsed.current_ref().to_string(),
        to_tag: tag.clone(),
        to_commit: commit.clone(),
        old_line: current.to_string(),
        new_line,
    })
}

/// `text` with `changes` applied. Lines not named by a change are untouched,
/// as are line endings and the trailing newline.
pub fn apply_changes(text: &str, changes: &[LineChange]) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    for change in changes {
        if let Some(slot) = change
            .line_number
            .checked_sub(1)
            .and_then(|idx| lines.get_mut(idx))
        {
            *slot = &change.new_line;
        }
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// apply_file
// ---------------------------------------------------------------------------

/// Rewrite the flagged references of one file.
pub fn apply_file(path: &Path, references: &[ActionReference]) -> Result<ApplyResult, UpdateError> {
    let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;

    let changes = pending_changes(&text, references);
    if changes.is_empty() {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(ApplyResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    let updated = apply_changes(&text, &changes);
    let tmp = tmp_path(path);
    write_with_tmp(path, &updated, &tmp)?;

    for change in &changes {
        tracing::info!(
            "{}:{} {}@{} -> {} ({})",
            path.display(),
            change.line_number,
            change.repo_path,
            change.from_ref,
            change.to_tag,
            change.to_commit.short()
        );
    }
    Ok(ApplyResult::Written {
        path: path.to_path_buf(),
        changes,
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".hashpin.tmp");
    PathBuf::from(name)
}

fn write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), UpdateError> {
    let permissions = fs::metadata(path).map_err(|e| io_err(path, e))?.permissions();

    let written = create_tmp(tmp, &permissions)
        .and_then(|mut file| file.write_all(content.as_bytes()))
        .and_then(|()| fs::set_permissions(tmp, permissions));
    if let Err(e) = written {
        let _ = fs::remove_file(tmp);
        return Err(io_err(tmp, e));
    }
    if let Err(e) = fs::rename(tmp, path) {
        let _ = fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// A fresh tmp file that never has wider permissions than the original.
fn create_tmp(tmp: &Path, permissions: &Permissions) -> io::Result<File> {
    match fs::remove_file(tmp) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(permissions.mode());
    }
    #[cfg(not(unix))]
    let _ = permissions;
    options.open(tmp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
