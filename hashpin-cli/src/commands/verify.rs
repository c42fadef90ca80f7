//! `hashpin verify`: fail unless every reference is pinned to a commit.

use anyhow::{bail, Context, Result};
use colored::Colorize;

use hashpin_core::{verify_workflows, VerifyError};

use crate::config::RunConfig;

pub fn run(config: &RunConfig) -> Result<()> {
    println!("Verifying all actions are pinned to commits...");
    match verify_workflows(config.workflows_dir()) {
        Ok(report) => {
            println!(
                "{} All {} action reference(s) in {} file(s) are pinned",
                "✓".green().bold(),
                report.pinned,
                report.files
            );
            Ok(())
        }
        Err(VerifyError::Unpinned { refs }) => {
            println!("{} These actions are not pinned to commits:", "✗".red().bold());
            for r in &refs {
                println!("  {r}");
            }
            bail!("{} unpinned action reference(s)", refs.len())
        }
        Err(VerifyError::Unreadable { failures }) => {
            println!("{} These workflow files could not be read:", "✗".red().bold());
            for failure in &failures {
                println!("  {failure}");
            }
            bail!("{} workflow file(s) could not be verified", failures.len())
        }
        Err(err) => Err(err).context("verification failed"),
    }
}
