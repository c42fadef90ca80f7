//! Line-oriented recognition of `uses: owner/repo@ref` references.
//!
//! Workflow files are not parsed as YAML. Each line is matched against a
//! single pattern:
//!
//! ```text
//! <indent>[- ]uses: ["|']<repo_path>@<ref>["|'][ # <comment>]<rest>
//! ```
//!
//! The byte spans of every part are kept so a line can be rebuilt exactly or
//! rewritten in place.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{io_err, CoreError};
use crate::types::{ActionReference, CommitId, WorkflowActionSet};

// Groups: 1-3 double-quoted, 4-6 single-quoted, 7-8 bare, 9 comment.
fn uses_re() -> &'static Regex {
    static USES_RE: OnceLock<Regex> = OnceLock::new();
    USES_RE.get_or_init(|| {
        Regex::new(concat!(
            r#"^\s*(?:-\s+)?uses:\s+"#,
            r#"(?:"([^@\s"]+)@([^#\s"]+)(")"#,
            r#"|'([^@\s']+)@([^#\s']+)(')"#,
            r#"|([^@\s"']+)@([^#\s"']+))"#,
            r#"(?:\s*#\s*(\S+))?"#,
        ))
        .unwrap()
    })
}

/// A recognised reference line, borrowed from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    line: &'a str,
    repo_path: Range<usize>,
    current_ref: Range<usize>,
    /// Closing quote of a quoted `repo@ref` value.
    close_quote: Option<Range<usize>>,
    comment: Option<Range<usize>>,
    /// From the `@` through the end of the comment token (or closing quote).
    pin: Range<usize>,
}

impl<'a> ParsedLine<'a> {
    pub fn repo_path(&self) -> &'a str {
        &self.line[self.repo_path.clone()]
    }

    pub fn current_ref(&self) -> &'a str {
        &self.line[self.current_ref.clone()]
    }

    pub fn comment(&self) -> Option<&'a str> {
        self.comment.clone().map(|r| &self.line[r])
    }

    pub fn prefix(&self) -> &'a str {
        &self.line[..self.repo_path.start]
    }

    pub fn suffix(&self) -> &'a str {
        &self.line[self.pin.end..]
    }

    /// The line with its `@ref[ # comment]` section replaced by
    /// `@<commit> # <tag>`. Prefix, quoting and suffix are kept byte-for-byte.
    pub fn pinned(&self, commit: &CommitId, tag: &str) -> String {
        let close_quote = self.close_quote.clone().map_or("", |r| &self.line[r]);
        format!(
            "{}@{}{} # {}{}",
            &self.line[..self.pin.start],
            commit,
            close_quote,
            tag,
            self.suffix()
        )
    }
}

/// Recognise a single line. Returns `None` for lines that are not registry
/// action references, including local (`./path`) and `docker://` uses.
pub fn parse_line(line: &str) -> Option<ParsedLine<'_>> {
    let caps = uses_re().captures(line)?;
    let (repo, reference, close_quote) = if let Some(repo) = caps.get(1) {
        (repo, caps.get(2)?, caps.get(3))
    } else if let Some(repo) = caps.get(4) {
        (repo, caps.get(5)?, caps.get(6))
    } else {
        (caps.get(7)?, caps.get(8)?, None)
    };
    let comment = caps.get(9);

    let repo_path = repo.as_str();
    if repo_path.starts_with('.') || repo_path.contains("://") {
        return None;
    }

    let pin_end = comment
        .or(close_quote)
        .map_or(reference.end(), |m| m.end());
    Some(ParsedLine {
        line,
        repo_path: repo.range(),
        current_ref: reference.range(),
        close_quote: close_quote.map(|q| q.range()),
        comment: comment.map(|c| c.range()),
        pin: (repo.end())..pin_end,
    })
}

/// Every reference in `text`, in line order.
pub fn parse_workflow_text(path: &Path, text: &str) -> Vec<ActionReference> {
    text.split('\n')
        .enumerate()
        .filter_map(|(idx, line)| {
            let parsed = parse_line(line)?;
            let current_ref = parsed.current_ref().to_string();
            Some(ActionReference {
                repo_path: parsed.repo_path().to_string(),
                current_commit: CommitId::parse(&current_ref),
                current_ref,
                comment: parsed.comment().map(str::to_string),
                latest_tag: None,
                latest_commit: None,
                needs_update: false,
                line_number: idx + 1,
                original_line: line.to_string(),
                source_file: path.to_path_buf(),
                repo_start: parsed.repo_path.start,
                pin: parsed.pin.clone(),
            })
        })
        .collect()
}

/// Read and parse one workflow file.
///
/// Bytes that are not valid UTF-8 (a Latin-1 comment, say) are replaced
/// rather than failing the file, so its references are still seen.
pub fn parse_workflow_file(path: &Path) -> Result<Vec<ActionReference>, CoreError> {
    let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(parse_workflow_text(path, &String::from_utf8_lossy(&bytes)))
}

/// Result of scanning a workflow directory.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub actions: WorkflowActionSet,
    /// Files that could not be read. Scanning continued past them.
    pub failures: Vec<CoreError>,
}

/// `true` for `*.yml` / `*.yaml`.
pub fn is_workflow_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

/// Scan the top level of `dir` for workflow files and parse each one.
///
/// An unreadable directory is an error. An unreadable file is recorded in
/// [`ScanOutcome::failures`] and the scan moves on.
pub fn scan_workflows(dir: &Path) -> Result<ScanOutcome, CoreError> {
    let entries = fs::read_dir(dir).map_err(|e| io_err(dir, e))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_workflow_file(&path) {
            files.push(path);
        }
    }
    files.sort();

    let mut outcome = ScanOutcome::default();
    for path in files {
        match parse_workflow_file(&path) {
            Ok(refs) if refs.is_empty() => {
                tracing::debug!("no action references in {}", path.display());
            }
            Ok(refs) => {
                tracing::debug!("{} action reference(s) in {}", refs.len(), path.display());
                outcome.actions.insert(path, refs);
            }
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable workflow file");
                outcome.failures.push(err);
            }
        }
    }
    Ok(outcome)
}
