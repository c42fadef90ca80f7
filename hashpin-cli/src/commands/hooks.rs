//! `hashpin install-hooks`: git hooks that keep workflows pinned.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;

const PRE_COMMIT: &str = r#"#!/bin/sh
# Installed by `hashpin install-hooks`.
set -e

echo "Verifying GitHub Actions are pinned to commits..."
if ! hashpin verify; then
    echo "Run 'hashpin update' to pin them, or commit with --no-verify."
    exit 1
fi
"#;

const PRE_PUSH: &str = r#"#!/bin/sh
# Installed by `hashpin install-hooks`. Never blocks the push.

echo "Checking for GitHub Action updates..."
if ! hashpin check >/dev/null 2>&1; then
    echo "warning: could not check for GitHub Action updates (rate limit or network?)"
fi
exit 0
"#;

pub fn run() -> Result<()> {
    let installed = install_at(Path::new("."))?;
    for path in &installed {
        println!("{} installed {}", "✓".green().bold(), path.display());
    }
    println!("\npre-commit: fails when an action is not pinned to a commit");
    println!("pre-push:   reports available action updates (never blocks)");
    println!("\nBypass with: git commit --no-verify");
    Ok(())
}

/// Write both hooks into `<repo>/.git/hooks`, replacing existing ones.
pub fn install_at(repo: &Path) -> Result<Vec<PathBuf>> {
    let git_dir = repo.join(".git");
    if !git_dir.is_dir() {
        bail!("not in a git repository (no .git directory found)");
    }
    let hooks_dir = git_dir.join("hooks");
    fs::create_dir_all(&hooks_dir)
        .with_context(|| format!("failed to create {}", hooks_dir.display()))?;

    let mut installed = Vec::new();
    for (name, script) in [("pre-commit", PRE_COMMIT), ("pre-push", PRE_PUSH)] {
        let path = hooks_dir.join(name);
        fs::write(&path, script)
            .with_context(|| format!("failed to write {}", path.display()))?;
        make_executable(&path)?;
        installed.push(path);
    }
    Ok(installed)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("failed to make {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn refuses_outside_a_git_repository() {
        let dir = TempDir::new().unwrap();
        let err = install_at(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not in a git repository"));
    }

    #[test]
    fn writes_both_hooks() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let installed = install_at(dir.path()).unwrap();
        assert_eq!(installed.len(), 2);

        let pre_commit = fs::read_to_string(dir.path().join(".git/hooks/pre-commit")).unwrap();
        assert!(pre_commit.starts_with("#!/bin/sh"));
        assert!(pre_commit.contains("hashpin verify"));
        let pre_push = fs::read_to_string(dir.path().join(".git/hooks/pre-push")).unwrap();
        assert!(pre_push.contains("hashpin check"));
        assert!(pre_push.trim_end().ends_with("exit 0"));
    }

    #[test]
    #[cfg(unix)]
    fn hooks_are_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        for path in install_at(dir.path()).unwrap() {
            let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o755, "{}", path.display());
        }
    }
}
