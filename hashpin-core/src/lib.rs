//! hashpin core library: reference types, the workflow parser, and pin
//! verification.
//!
//! - [`types`]: [`ActionReference`], [`WorkflowActionSet`], [`CommitId`], [`RepoId`]
//! - [`parser`]: line recognition and directory scan
//! - [`verify`]: read-only "everything is pinned" check
//! - [`error`]: [`CoreError`], [`VerifyError`]

pub mod error;
pub mod parser;
pub mod types;
pub mod verify;

pub use error::{CoreError, VerifyError};
pub use parser::{parse_line, parse_workflow_file, parse_workflow_text, scan_workflows, ScanOutcome};
pub use types::{is_commit_shaped, ActionReference, CommitId, RepoId, WorkflowActionSet};
pub use verify::{verify, verify_scan, verify_workflows, UnpinnedRef, VerifyReport};

/// Workflow directory relative to a repository root.
pub const DEFAULT_WORKFLOWS_DIR: &str = ".github/workflows";
