//! hashpin: pin GitHub Actions references to release commits.
//!
//! # Usage
//!
//! ```text
//! hashpin check [--json]
//! hashpin update [<workflow-file>] [--yes]
//! hashpin verify
//! hashpin install-hooks
//! hashpin version
//! ```
//!
//! `GITHUB_TOKEN` / `GH_TOKEN` (or `gh auth login`) raise the API rate limit.
//! `HASHPIN_LOG` sets log verbosity.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, update::UpdateArgs};
use config::{BuildInfo, RunConfig};
use hashpin_core::DEFAULT_WORKFLOWS_DIR;
use hashpin_registry::DEFAULT_API_URL;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "hashpin",
    version,
    about = "Pin GitHub Actions references to the commit of their latest release",
    long_about = None,
)]
struct Cli {
    /// Directory holding the workflow files.
    #[arg(long, global = true, default_value = DEFAULT_WORKFLOWS_DIR)]
    workflows_dir: PathBuf,

    /// GitHub REST API base URL.
    #[arg(long, global = true, env = "HASHPIN_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report which references have a newer release, without writing.
    Check(CheckArgs),

    /// Pin references to the latest release commit, with confirmation.
    Update(UpdateArgs),

    /// Fail if any reference is not pinned to a commit.
    Verify,

    /// Install git pre-commit and pre-push hooks.
    InstallHooks,

    /// Show build information.
    Version,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = RunConfig {
        build: BuildInfo::current(),
        workflows_dir: cli.workflows_dir,
        api_url: cli.api_url,
    };

    match cli.command {
        Commands::Check(args) => args.run(&config),
        Commands::Update(args) => args.run(&config),
        Commands::Verify => commands::verify::run(&config),
        Commands::InstallHooks => commands::hooks::run(),
        Commands::Version => {
            commands::version::run(&config);
            Ok(())
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("HASHPIN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
