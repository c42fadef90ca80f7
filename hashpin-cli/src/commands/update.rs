//! `hashpin update`: pin references to their latest release commit.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use hashpin_core::ScanOutcome;
use hashpin_update::{
    run_update, AssumeYes, FileOutcome, LineChange, Prompt, UpdateError, UpdateReport,
};

use crate::config::RunConfig;

/// Arguments for `hashpin update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Only update this workflow file. A bare name is looked up in the workflow directory.
    pub target: Option<PathBuf>,

    /// Apply every change without asking.
    #[arg(long, short)]
    pub yes: bool,
}

impl UpdateArgs {
    pub fn run(self, config: &RunConfig) -> Result<()> {
        println!("Scanning {}...", config.workflows_dir().display());
        let ScanOutcome {
            actions: mut set,
            failures,
        } = super::scan(config)?;
        if set.is_empty() {
            println!("No GitHub Actions found in workflow files");
            return super::fail_on_unreadable(&failures);
        }

        let target = self.target.as_deref().map(|t| config.resolve_target(t));
        if let Some(target) = &target {
            if !set.contains(target) {
                bail!(
                    "{} is not a workflow file with action references",
                    target.display()
                );
            }
        }

        let resolver = super::connect(config, false);
        let plan = super::plan(&mut set, &resolver, false);
        super::print_skipped(&plan);

        println!("\nUpdating workflow files...");
        let mut prompt: Box<dyn Prompt> = if self.yes {
            Box::new(AssumeYes)
        } else {
            Box::new(StdinPrompt)
        };
        let report = run_update(&set, target.as_deref(), prompt.as_mut())
            .context("update aborted; no workflow file was modified")?;

        print_report(&report);
        if report.has_failures() {
            bail!("{} workflow file(s) failed to update", report.failed());
        }
        super::fail_on_unreadable(&failures)
    }
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// Shows the pending diff and reads `y`/`N` from stdin.
struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(
        &mut self,
        path: &Path,
        changes: &[LineChange],
        diff: &str,
    ) -> Result<bool, UpdateError> {
        println!("\n{}:", path.display().to_string().bold());
        for change in changes.iter().rev() {
            println!(
                "  {}: {} → {} ({})",
                change.repo_path,
                change.from_ref,
                change.to_tag,
                change.to_commit.short()
            );
        }
        print_diff(diff);

        print!("Apply changes to {}? (y/N): ", path.display());
        io::stdout().flush().map_err(UpdateError::Prompt)?;

        let mut answer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut answer)
            .map_err(UpdateError::Prompt)?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{line}");
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

fn print_report(report: &UpdateReport) {
    if report.files.is_empty() {
        println!("  {} No updates needed for any workflow file", "✓".green().bold());
        return;
    }

    for file in &report.files {
        let path = file.path.display();
        match &file.outcome {
            FileOutcome::Applied { changes } => {
                println!(
                    "  {} {path}: {} line(s) updated",
                    "✓".green().bold(),
                    changes.len()
                );
            }
            FileOutcome::AlreadyCurrent => {
                println!("  {} {path}: already up to date", "✓".green().bold());
            }
            FileOutcome::Declined => {
                println!("  {} {path}: skipped", "-".bright_black().bold());
            }
            FileOutcome::Failed {
                error,
                restore_error,
            } => {
                println!("  {} {path}: {error}", "✗".red().bold());
                match restore_error {
                    Some(restore) => println!(
                        "    {} could not restore from {}: {restore}",
                        "✗".red().bold(),
                        file.backup.display()
                    ),
                    None => println!("    restored from {}", file.backup.display()),
                }
            }
        }
    }

    println!(
        "\n{} applied | {} skipped | {} failed",
        report.applied(),
        report.declined(),
        report.failed()
    );
}
