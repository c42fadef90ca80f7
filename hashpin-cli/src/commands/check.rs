//! `hashpin check`: report available updates without writing anything.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use hashpin_core::{ActionReference, CommitId, CoreError, ScanOutcome, WorkflowActionSet};
use hashpin_update::PlanReport;

use crate::config::RunConfig;

/// Arguments for `hashpin check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Emit machine-readable JSON instead of the table.
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub fn run(self, config: &RunConfig) -> Result<()> {
        if !self.json {
            println!("Scanning {}...", config.workflows_dir().display());
        }
        let ScanOutcome {
            actions: mut set,
            failures,
        } = super::scan(config)?;
        if set.is_empty() {
            if self.json {
                print_json(&set, &PlanReport::default(), &failures)?;
            } else {
                println!("No GitHub Actions found in workflow files");
            }
            return super::fail_on_unreadable(&failures);
        }

        let resolver = super::connect(config, self.json);
        let report = super::plan(&mut set, &resolver, self.json);

        if self.json {
            print_json(&set, &report, &failures)?;
        } else {
            print_table(&set, &report);
            super::print_skipped(&report);
        }
        super::fail_on_unreadable(&failures)
    }
}

// ---------------------------------------------------------------------------
// Table output
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct CheckTableRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "line")]
    line: usize,
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "current")]
    current: String,
    #[tabled(rename = "latest")]
    latest: String,
    #[tabled(rename = "status")]
    status: String,
}

fn print_table(set: &WorkflowActionSet, report: &PlanReport) {
    let rows: Vec<CheckTableRow> = set
        .references()
        .map(|r| CheckTableRow {
            file: file_name(r),
            line: r.line_number,
            action: r.repo_path.clone(),
            current: r.current_ref.clone(),
            latest: r.latest_tag.clone().unwrap_or_else(|| "-".to_string()),
            status: status_label(r, report).to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("\n{table}");

    println!(
        "{} actions | {} up to date | {} need updates | {} skipped",
        report.checked,
        report.up_to_date.to_string().green(),
        report.needs_update.to_string().yellow(),
        report.skipped.len(),
    );
    if report.needs_update > 0 {
        println!("Run 'hashpin update' to pin them.");
    }
}

fn file_name(reference: &ActionReference) -> String {
    reference
        .source_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| reference.source_file.display().to_string())
}

fn status_label(reference: &ActionReference, report: &PlanReport) -> &'static str {
    if reference.needs_update {
        "UPDATE"
    } else if is_skipped(reference, report) {
        "SKIPPED"
    } else {
        "CURRENT"
    }
}

fn is_skipped(reference: &ActionReference, report: &PlanReport) -> bool {
    let location = reference.location();
    report.skipped.iter().any(|s| s.location == location)
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CheckReportJson<'a> {
    summary: CheckSummaryJson,
    references: Vec<ReferenceJson<'a>>,
    skipped: Vec<SkippedJson>,
    unreadable: Vec<String>,
}

#[derive(Serialize)]
struct CheckSummaryJson {
    total: usize,
    up_to_date: usize,
    needs_update: usize,
    skipped: usize,
    unreadable: usize,
}

#[derive(Serialize)]
struct ReferenceJson<'a> {
    file: String,
    line: usize,
    repo: &'a str,
    current_ref: &'a str,
    current_commit: Option<&'a CommitId>,
    latest_tag: Option<&'a str>,
    latest_commit: Option<&'a CommitId>,
    needs_update: bool,
}

#[derive(Serialize)]
struct SkippedJson {
    location: String,
    error: String,
}

fn print_json(
    set: &WorkflowActionSet,
    report: &PlanReport,
    failures: &[CoreError],
) -> Result<()> {
    let payload = CheckReportJson {
        summary: CheckSummaryJson {
            total: report.checked,
            up_to_date: report.up_to_date,
            needs_update: report.needs_update,
            skipped: report.skipped.len(),
            unreadable: failures.len(),
        },
        references: set
            .references()
            .map(|r| ReferenceJson {
                file: r.source_file.display().to_string(),
                line: r.line_number,
                repo: &r.repo_path,
                current_ref: &r.current_ref,
                current_commit: r.current_commit.as_ref(),
                latest_tag: r.latest_tag.as_deref(),
                latest_commit: r.latest_commit.as_ref(),
                needs_update: r.needs_update,
            })
            .collect(),
        skipped: report
            .skipped
            .iter()
            .map(|s| SkippedJson {
                location: s.location.clone(),
                error: s.error.to_string(),
            })
            .collect(),
        unreadable: failures.iter().map(ToString::to_string).collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize check JSON")?
    );
    Ok(())
}
