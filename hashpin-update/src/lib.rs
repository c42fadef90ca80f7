//! # hashpin-update
//!
//! Update planning and safe in-place rewriting of workflow files.
//!
//! [`plan`] flags references whose commit differs from the latest release;
//! [`run_update`] backs files up, asks for confirmation, and applies the
//! rewrites with per-file rollback.

pub mod diff;
pub mod error;
pub mod orchestrator;
pub mod planner;
pub mod writer;

pub use diff::preview_diff;
pub use error::UpdateError;
pub use orchestrator::{
    backup_path, create_backups, run_update, select_files, AssumeYes, FileOutcome, FileReport,
    Prompt, UpdateReport,
};
pub use planner::{plan, PlanReport, Planner, SkippedReference};
pub use writer::{apply_changes, apply_file, pending_changes, ApplyResult, LineChange};
