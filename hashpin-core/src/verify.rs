//! Read-only check that every reference is pinned to a commit identifier.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::VerifyError;
use crate::parser::{scan_workflows, ScanOutcome};
use crate::types::WorkflowActionSet;

/// A reference whose ref is a tag or branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpinnedRef {
    pub file: PathBuf,
    pub line: usize,
    pub repo_path: String,
    pub current_ref: String,
}

impl fmt::Display for UnpinnedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}@{}",
            self.file.display(),
            self.line,
            self.repo_path,
            self.current_ref
        )
    }
}

/// Summary of a successful verification.
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Number of references checked (all pinned).
    pub pinned: usize,
    pub files: usize,
}

/// Every reference in `set` that is not commit-shaped.
pub fn unpinned(set: &WorkflowActionSet) -> Vec<UnpinnedRef> {
    set.references()
        .filter(|r| !r.is_pinned())
        .map(|r| UnpinnedRef {
            file: r.source_file.clone(),
            line: r.line_number,
            repo_path: r.repo_path.clone(),
            current_ref: r.current_ref.clone(),
        })
        .collect()
}

/// Fail with every offending reference when any ref is not a commit identifier.
pub fn verify(set: &WorkflowActionSet) -> Result<usize, VerifyError> {
    let refs = unpinned(set);
    if refs.is_empty() {
        Ok(set.reference_count())
    } else {
        Err(VerifyError::Unpinned { refs })
    }
}

/// Verify a finished scan. Unpinned references are reported first; a scan
/// that skipped any file never passes.
pub fn verify_scan(outcome: ScanOutcome) -> Result<VerifyReport, VerifyError> {
    let pinned = verify(&outcome.actions)?;
    if !outcome.failures.is_empty() {
        return Err(VerifyError::Unreadable {
            failures: outcome.failures,
        });
    }
    Ok(VerifyReport {
        pinned,
        files: outcome.actions.len(),
    })
}

/// Rescan `dir` and verify the result.
pub fn verify_workflows(dir: &Path) -> Result<VerifyReport, VerifyError> {
    verify_scan(scan_workflows(dir)?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::error::CoreError;
    use crate::parser::parse_workflow_text;

    const SHA: &str = "11bd71901bbe5b1630ceea73d27597364c9af683";

    #[test]
    fn all_pinned_passes() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ci.yml"),
            format!("steps:\n  - uses: actions/checkout@{SHA} # v4.2.2\n"),
        )
        .unwrap();

        let report = verify_workflows(dir.path()).expect("verify");
        assert_eq!(report.pinned, 1);
        assert_eq!(report.files, 1);
    }

    #[test]
    fn unpinned_reports_every_offender() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.yml"),
            format!("  - uses: actions/checkout@v4\n  - uses: actions/cache@{SHA}\n"),
        )
        .unwrap();
        fs::write(dir.path().join("b.yaml"), "  - uses: actions/setup-go@main\n").unwrap();

        let err = verify_workflows(dir.path()).expect_err("should fail");
        let VerifyError::Unpinned { refs } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(refs.len(), 2);
        let rendered = err.to_string();
        assert!(rendered.contains("a.yml:1 actions/checkout@v4"));
        assert!(rendered.contains("b.yaml:1 actions/setup-go@main"));
    }

    #[test]
    fn latin1_comment_does_not_hide_an_unpinned_reference() {
        let dir = TempDir::new().unwrap();
        let latin1 = b"# caf\xe9\n  - uses: actions/checkout@v4\n";
        fs::write(dir.path().join("ci.yml"), latin1).unwrap();

        let err = verify_workflows(dir.path()).expect_err("should fail");
        assert!(err.to_string().contains("ci.yml:2 actions/checkout@v4"));
    }

    #[test]
    fn unreadable_file_fails_verification() {
        let mut outcome = ScanOutcome::default();
        let path = PathBuf::from("ci.yml");
        let text = format!("  - uses: actions/checkout@{SHA}\n");
        outcome.actions.insert(path.clone(), parse_workflow_text(&path, &text));
        outcome.failures.push(CoreError::Io {
            path: PathBuf::from("locked.yml"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });

        let err = verify_scan(outcome).expect_err("should fail");
        let VerifyError::Unreadable { failures } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(failures.len(), 1);
        assert!(err.to_string().contains("locked.yml"));
    }

    #[test]
    fn unpinned_is_reported_before_unreadable() {
        let mut outcome = ScanOutcome::default();
        let path = PathBuf::from("ci.yml");
        outcome
            .actions
            .insert(path.clone(), parse_workflow_text(&path, "  - uses: a/b@v1\n"));
        outcome.failures.push(CoreError::Io {
            path: PathBuf::from("locked.yml"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });

        let err = verify_scan(outcome).expect_err("should fail");
        assert!(matches!(err, VerifyError::Unpinned { .. }));
    }

    #[test]
    fn quoted_pinned_reference_passes() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ci.yml"),
            format!("steps:\n  - uses: \"actions/checkout@{SHA}\" # v4.2.2\n"),
        )
        .unwrap();

        let report = verify_workflows(dir.path()).expect("verify");
        assert_eq!(report.pinned, 1);
    }

    #[test]
    fn empty_directory_passes() {
        let dir = TempDir::new().unwrap();
        let report = verify_workflows(dir.path()).expect("verify");
        assert_eq!(report.pinned, 0);
    }

    #[test]
    fn missing_directory_is_a_scan_error() {
        let dir = TempDir::new().unwrap();
        let err = verify_workflows(&dir.path().join("nope")).expect_err("missing dir");
        assert!(matches!(err, VerifyError::Scan(_)));
    }
}
