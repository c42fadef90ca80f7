pub mod check;
pub mod hooks;
pub mod update;
pub mod verify;
pub mod version;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use hashpin_core::{scan_workflows, ActionReference, CoreError, ScanOutcome, WorkflowActionSet};
use hashpin_registry::{auth, AuthSource, GitHubClient, RegistryError, Resolver};
use hashpin_update::{PlanReport, Planner};

use crate::config::RunConfig;

/// Scan the workflow directory, warning about files that could not be read.
///
/// Callers finish their run and then pass `failures` to
/// [`fail_on_unreadable`].
pub(crate) fn scan(config: &RunConfig) -> Result<ScanOutcome> {
    let dir = config.workflows_dir();
    let outcome = scan_workflows(dir)
        .with_context(|| format!("failed to scan workflow directory {}", dir.display()))?;
    for failure in &outcome.failures {
        eprintln!("{} {failure}", "warning:".yellow().bold());
    }
    Ok(outcome)
}

/// Exit non-zero when the scan skipped any workflow file.
pub(crate) fn fail_on_unreadable(failures: &[CoreError]) -> Result<()> {
    if !failures.is_empty() {
        bail!(
            "{} workflow file(s) could not be read and were not checked",
            failures.len()
        );
    }
    Ok(())
}

/// Build a resolver against the configured API, reporting how it authenticates.
pub(crate) fn connect(config: &RunConfig, quiet: bool) -> Resolver<GitHubClient> {
    let credentials = auth::discover();
    tracing::debug!(?credentials, "discovered credentials");
    if !quiet {
        print_auth(credentials.source);
    }
    Resolver::new(GitHubClient::new(&config.api_url, credentials.token))
}

fn print_auth(source: AuthSource) {
    match source {
        AuthSource::Anonymous => {
            println!("GitHub API: {} (lower rate limits)", "unauthenticated".yellow());
            println!("  Set GITHUB_TOKEN or GH_TOKEN, or run 'gh auth login'.");
        }
        source => println!("GitHub API: {} via {source}", "authenticated".green()),
    }
}

/// Plan `set` in place, printing one line per reference unless `quiet`.
pub(crate) fn plan(
    set: &mut WorkflowActionSet,
    resolver: &Resolver<GitHubClient>,
    quiet: bool,
) -> PlanReport {
    let mut current_file: Option<PathBuf> = None;
    Planner::new(resolver).plan_with(set, |reference, error| {
        if quiet {
            return;
        }
        if current_file.as_ref() != Some(&reference.source_file) {
            println!("\n{}:", reference.source_file.display().to_string().bold());
            current_file = Some(reference.source_file.clone());
        }
        println!("  {}", progress_line(reference, error));
    })
}

fn progress_line(reference: &ActionReference, error: Option<&RegistryError>) -> String {
    let name = &reference.repo_path;
    if let Some(error) = error {
        return format!("{} {name}: {error}", "✗".red().bold());
    }
    let latest = reference.latest_tag.as_deref().unwrap_or("?");
    if reference.needs_update {
        format!(
            "{} {name}: {} → {latest}",
            "↑".yellow().bold(),
            reference.current_ref
        )
    } else {
        format!("{} {name}: up to date ({latest})", "✓".green().bold())
    }
}

pub(crate) fn print_skipped(report: &PlanReport) {
    if report.skipped.is_empty() {
        return;
    }
    println!(
        "\n{} {} reference(s) could not be checked:",
        "warning:".yellow().bold(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!("  {}: {}", skipped.location, skipped.error);
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn skipped_files_fail_the_run() {
        assert!(fail_on_unreadable(&[]).is_ok());

        let failures = vec![CoreError::Io {
            path: PathBuf::from("ci.yml"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }];
        let err = fail_on_unreadable(&failures).unwrap_err();
        assert!(err.to_string().contains("1 workflow file(s) could not be read"));
    }
}
